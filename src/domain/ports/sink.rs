use thiserror::Error;

use crate::domain::value_objects::log_level::LogLevel;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write log entry: {0}")]
    WriteFailed(String),
    #[error("sink is closed")]
    Closed,
}

/// Destination for leveled log messages (console, rotated file, ...)
pub trait Sink: Send + Sync {
    /// Write one message at the given level.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the entry cannot be written or the sink
    /// has already been closed.
    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError>;

    /// Flush and release underlying resources. Writes after `close` fail
    /// with `SinkError::Closed`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if buffered data cannot be flushed.
    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
