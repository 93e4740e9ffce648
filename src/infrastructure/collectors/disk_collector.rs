use std::sync::Mutex;

use sysinfo::Disks;

use crate::domain::entities::disk::DiskInfo;
use crate::domain::ports::collector::CollectionError;

/// Filesystem types to exclude from disk metrics.
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "tmpfs",
    "devtmpfs",
    "sysfs",
    "proc",
    "cgroup2",
    "overlay",
    "squashfs",
    "efivarfs",
    "bpf",
    "hugetlbfs",
    "mqueue",
    "pstore",
    "securityfs",
    "debugfs",
    "tracefs",
    "fusectl",
    "rpc_pipefs",
];

/// Per-mount usage of real filesystems, in the order the OS lists them.
pub struct DiskCollector {
    disks: Mutex<Disks>,
}

impl DiskCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    /// Refresh usage figures and list every real, non-empty mount.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::MetricsUnavailable` if the internal mutex is poisoned.
    pub fn collect(&self) -> Result<Vec<DiskInfo>, CollectionError> {
        let mut disks = self
            .disks
            .lock()
            .map_err(|e| CollectionError::MetricsUnavailable(format!("disk lock poisoned: {e}")))?;
        disks.refresh(true);

        Ok(disks
            .iter()
            .filter(|d| !is_pseudo(&d.file_system().to_string_lossy()) && d.total_space() > 0)
            .map(|disk| {
                DiskInfo::from_space(
                    disk.mount_point().to_string_lossy(),
                    disk.total_space(),
                    disk.available_space(),
                )
            })
            .collect())
    }
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_pseudo(file_system: &str) -> bool {
    PSEUDO_FILESYSTEMS.contains(&file_system)
}
