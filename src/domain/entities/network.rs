use serde::{Deserialize, Serialize};

/// Throughput of one network interface since the previous sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub interface: String,
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
}

impl NetworkInfo {
    /// The busier of the two directions.
    #[must_use]
    pub fn peak_rate(&self) -> f64 {
        self.rx_bytes_per_sec.max(self.tx_bytes_per_sec)
    }
}

/// Human-readable byte rate, e.g. `1.5 MB/s`.
#[must_use]
pub fn format_rate(bytes_per_sec: f64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];
    let mut value = bytes_per_sec;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
