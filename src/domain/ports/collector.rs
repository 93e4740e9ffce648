use thiserror::Error;

use crate::domain::entities::snapshot::Snapshot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("failed to collect system metrics: {0}")]
    MetricsUnavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("timeout while collecting data")]
    Timeout,
}

pub trait MetricsSource: Send + Sync {
    /// Take one snapshot of every monitored metric.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError` if metrics are unavailable,
    /// permission is denied, or collection times out.
    fn sample(&self) -> Result<Snapshot, CollectionError>;
}
