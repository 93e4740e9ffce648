use std::sync::Mutex;
use std::time::Instant;

use sysinfo::Networks;

use crate::domain::entities::network::NetworkInfo;
use crate::domain::ports::collector::CollectionError;

struct NetworkState {
    networks: Networks,
    last_refresh: Instant,
}

/// Per-interface byte rates computed from the traffic seen since the
/// previous call.
pub struct NetworkCollector {
    state: Mutex<NetworkState>,
}

impl NetworkCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NetworkState {
                networks: Networks::new_with_refreshed_list(),
                last_refresh: Instant::now(),
            }),
        }
    }

    /// Interfaces sorted by name. The first call after construction covers
    /// the time since `new`.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::MetricsUnavailable` if the internal mutex is poisoned.
    pub fn collect(&self) -> Result<Vec<NetworkInfo>, CollectionError> {
        let mut state = self.state.lock().map_err(|e| {
            CollectionError::MetricsUnavailable(format!("network lock poisoned: {e}"))
        })?;

        state.networks.refresh(true);
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refresh).as_secs_f64();
        state.last_refresh = now;

        let mut interfaces: Vec<NetworkInfo> = state
            .networks
            .iter()
            .map(|(name, data)| NetworkInfo {
                interface: name.clone(),
                rx_bytes_per_sec: rate(data.received(), elapsed),
                tx_bytes_per_sec: rate(data.transmitted(), elapsed),
            })
            .collect();
        interfaces.sort_by(|a, b| a.interface.cmp(&b.interface));
        Ok(interfaces)
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_precision_loss)]
fn rate(bytes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        bytes as f64 / elapsed_secs
    } else {
        0.0
    }
}
