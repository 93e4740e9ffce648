use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::disk::DiskInfo;
use super::network::NetworkInfo;
use super::process::ProcessSample;

/// One point-in-time reading of every monitored metric.
///
/// Disks keep the order the source reported them in, interfaces and
/// processes are ordered by the source as well. The evaluator relies on
/// that order being stable between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    #[serde(default)]
    pub disks: Vec<DiskInfo>,
    #[serde(default)]
    pub networks: Vec<NetworkInfo>,
    #[serde(default)]
    pub processes: Vec<ProcessSample>,
}

/// CPU usage information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub global_usage_percent: f64,
    #[serde(default)]
    pub per_core_usage: Vec<f64>,
}

/// System memory usage information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub usage_percent: f64,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl CpuInfo {
    #[must_use]
    pub fn core_count(&self) -> usize {
        self.per_core_usage.len()
    }
}

impl Snapshot {
    /// Highest usage percentage across all mounts, 0 when no disk is reported.
    #[must_use]
    pub fn max_disk_percent(&self) -> f64 {
        self.disks
            .iter()
            .map(|d| d.usage_percent)
            .fold(0.0, f64::max)
    }

    /// Total inbound and outbound byte rates summed over every interface.
    #[must_use]
    pub fn total_network_rates(&self) -> (f64, f64) {
        self.networks.iter().fold((0.0, 0.0), |(rx, tx), n| {
            (rx + n.rx_bytes_per_sec, tx + n.tx_bytes_per_sec)
        })
    }
}
