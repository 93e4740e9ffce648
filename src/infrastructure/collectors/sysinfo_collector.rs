use std::sync::Mutex;

use sysinfo::System;

use super::disk_collector::DiskCollector;
use super::network_collector::NetworkCollector;
use crate::domain::entities::{
    process::ProcessSample,
    snapshot::{CpuInfo, MemoryInfo, Snapshot},
};
use crate::domain::ports::collector::{CollectionError, MetricsSource};

/// Returns `(numerator / denominator) * 100.0`, or `0.0` when `denominator` is zero.
#[allow(clippy::cast_precision_loss)]
fn safe_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        (numerator as f64 / denominator as f64) * 100.0
    } else {
        0.0
    }
}

/// `MetricsSource` backed by the `sysinfo` crate.
///
/// `sysinfo::System` needs `&mut self` to refresh while the port takes
/// `&self`, hence the mutex.
pub struct SysinfoSource {
    sys: Mutex<System>,
    disk_collector: DiskCollector,
    network_collector: NetworkCollector,
}

impl SysinfoSource {
    /// Creates a source with pre-initialized system data. CPU usage needs two
    /// refreshes separated by `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` to be
    /// meaningful; the first tick of the agent provides the second one.
    #[must_use]
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: Mutex::new(sys),
            disk_collector: DiskCollector::new(),
            network_collector: NetworkCollector::new(),
        }
    }

    /// Waits the minimal CPU update interval after the initial refresh so the
    /// very first `sample` has real CPU figures. Used by one-shot commands.
    #[must_use]
    pub fn warmed_up() -> Self {
        let source = Self::new();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        source
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn sample(&self) -> Result<Snapshot, CollectionError> {
        let mut sys = self.sys.lock().map_err(|e| {
            CollectionError::MetricsUnavailable(format!("system lock poisoned: {e}"))
        })?;
        sys.refresh_all();

        let memory = collect_memory(&sys)?;
        let cpu = collect_cpu(&sys);
        let processes = collect_processes(&sys, memory.total_bytes);
        drop(sys);

        let disks = self.disk_collector.collect()?;
        let networks = self.network_collector.collect()?;

        Ok(Snapshot {
            timestamp: chrono::Utc::now(),
            cpu,
            memory,
            disks,
            networks,
            processes,
        })
    }
}

fn collect_memory(sys: &System) -> Result<MemoryInfo, CollectionError> {
    let total = sys.total_memory();
    if total == 0 {
        return Err(CollectionError::MetricsUnavailable(
            "total memory reported as 0".to_string(),
        ));
    }
    let used = sys.used_memory();

    Ok(MemoryInfo {
        usage_percent: safe_percent(used, total),
        used_bytes: used,
        total_bytes: total,
    })
}

fn collect_cpu(sys: &System) -> CpuInfo {
    CpuInfo {
        global_usage_percent: f64::from(sys.global_cpu_usage()),
        per_core_usage: sys
            .cpus()
            .iter()
            .map(|cpu| f64::from(cpu.cpu_usage()))
            .collect(),
    }
}

fn collect_processes(sys: &System, total_memory: u64) -> Vec<ProcessSample> {
    let mut processes: Vec<ProcessSample> = sys
        .processes()
        .values()
        .map(|process| ProcessSample {
            pid: process.pid().as_u32(),
            name: process.name().to_string_lossy().to_string(),
            cpu_percent: f64::from(process.cpu_usage()),
            memory_percent: safe_percent(process.memory(), total_memory),
        })
        .collect();
    processes.sort_by_key(|p| p.pid);
    processes
}
