use std::sync::Arc;

use crate::domain::ports::sink::{Sink, SinkError};
use crate::domain::value_objects::log_level::LogLevel;

/// Forwards entries at or above `min_level` to several sinks.
///
/// Calls each sink in order and returns the first error encountered (if
/// any), but always calls all sinks.
pub struct CompositeSink {
    sinks: Vec<Arc<dyn Sink>>,
    min_level: LogLevel,
}

impl CompositeSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn Sink>>, min_level: LogLevel) -> Self {
        Self { sinks, min_level }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Default for CompositeSink {
    fn default() -> Self {
        Self::new(Vec::new(), LogLevel::default())
    }
}

impl Sink for CompositeSink {
    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        if !self.min_level.admits(level) {
            return Ok(());
        }
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.write(level, message) {
                tracing::warn!("Sink write failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn close(&self) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.close() {
                tracing::warn!("Sink close failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
