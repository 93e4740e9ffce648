use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::snapshot::Snapshot;
use crate::domain::ports::export::{ExportError, ExportWriter};

const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// One CSV row per snapshot. Mounts and interfaces are aggregated so every
/// file has the same columns.
#[derive(Debug, Serialize)]
struct SnapshotRow {
    timestamp: String,
    cpu_percent: f64,
    core_count: usize,
    memory_percent: f64,
    memory_used_bytes: u64,
    memory_total_bytes: u64,
    disk_max_percent: f64,
    disk_count: usize,
    net_rx_bytes_per_sec: f64,
    net_tx_bytes_per_sec: f64,
    process_count: usize,
}

impl From<&Snapshot> for SnapshotRow {
    fn from(snapshot: &Snapshot) -> Self {
        let (rx, tx) = snapshot.total_network_rates();
        Self {
            timestamp: snapshot.timestamp.to_rfc3339(),
            cpu_percent: round2(snapshot.cpu.global_usage_percent),
            core_count: snapshot.cpu.core_count(),
            memory_percent: round2(snapshot.memory.usage_percent),
            memory_used_bytes: snapshot.memory.used_bytes,
            memory_total_bytes: snapshot.memory.total_bytes,
            disk_max_percent: round2(snapshot.max_disk_percent()),
            disk_count: snapshot.disks.len(),
            net_rx_bytes_per_sec: round2(rx),
            net_tx_bytes_per_sec: round2(tx),
            process_count: snapshot.processes.len(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Writes each export cycle to `<directory>/<YYYYMMDD_HHMMSS>.csv`.
/// Never overwrites: a second batch in the same second gets `_1`, `_2`, ...
pub struct CsvSnapshotWriter {
    directory: PathBuf,
}

impl CsvSnapshotWriter {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn create_file(&self, cycle: DateTime<Utc>) -> Result<(PathBuf, File), ExportError> {
        let stamp = cycle.format(FILE_STAMP_FORMAT).to_string();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stamp}.csv")
            } else {
                format!("{stamp}_{attempt}.csv")
            };
            let path = self.directory.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(ExportError::WriteFailed(format!(
                        "cannot create {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        Err(ExportError::WriteFailed(format!(
            "no free file name for cycle {stamp} in {}",
            self.directory.display()
        )))
    }
}

impl ExportWriter for CsvSnapshotWriter {
    fn write_batch(
        &self,
        cycle: DateTime<Utc>,
        snapshots: &[Snapshot],
    ) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            ExportError::DirectoryUnavailable(format!("{}: {e}", self.directory.display()))
        })?;

        let (path, file) = self.create_file(cycle)?;
        let mut writer = csv::Writer::from_writer(file);
        let written = snapshots
            .iter()
            .try_for_each(|snapshot| writer.serialize(SnapshotRow::from(snapshot)))
            .map_err(|e| ExportError::WriteFailed(e.to_string()))
            .and_then(|()| {
                writer
                    .flush()
                    .map_err(|e| ExportError::WriteFailed(e.to_string()))
            });

        if let Err(e) = written {
            // a half-written file would duplicate rows on the next attempt
            drop(writer);
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }
        Ok(path)
    }
}
