use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::snapshot::Snapshot;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export file: {0}")]
    WriteFailed(String),
    #[error("export directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

/// Persists one export cycle worth of snapshots
pub trait ExportWriter: Send + Sync {
    /// Write `snapshots` as a single batch named after `cycle`, returning
    /// the path of the created file.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the target directory cannot be created or
    /// the file cannot be written.
    fn write_batch(
        &self,
        cycle: DateTime<Utc>,
        snapshots: &[Snapshot],
    ) -> Result<PathBuf, ExportError>;
}
