use serde::{Deserialize, Serialize};

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Size limit and retained history of a rotated log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    pub max_size_bytes: u64,
    /// Number of numbered backups kept next to the active file.
    /// Zero truncates the active file in place.
    pub backup_count: u32,
}

impl RotationPolicy {
    #[must_use]
    pub const fn from_megabytes(max_size_mb: u64, backup_count: u32) -> Self {
        Self {
            max_size_bytes: max_size_mb.saturating_mul(BYTES_PER_MB),
            backup_count,
        }
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::from_megabytes(10, 5)
    }
}
