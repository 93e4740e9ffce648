use serde::{Deserialize, Serialize};

/// Usage of one mounted filesystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub mount_point: String,
    pub usage_percent: f64,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl DiskInfo {
    /// Build a disk entry from raw byte counts. A zero-sized mount reads as 0%.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_space(mount_point: impl Into<String>, total_bytes: u64, available_bytes: u64) -> Self {
        let used = total_bytes.saturating_sub(available_bytes);
        let usage_percent = if total_bytes == 0 {
            0.0
        } else {
            used as f64 / total_bytes as f64 * 100.0
        };
        Self {
            mount_point: mount_point.into(),
            usage_percent,
            total_bytes,
            available_bytes,
        }
    }
}
