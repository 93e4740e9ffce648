use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::domain::entities::snapshot::Snapshot;
use crate::domain::ports::export::{ExportError, ExportWriter};

/// Outcome of a successful flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub rows: usize,
    pub path: Option<PathBuf>,
}

/// Buffers snapshots between export cycles and hands them to an
/// `ExportWriter` on `flush`.
///
/// `add` and the take/restore steps of `flush` share one lock, so no
/// snapshot is lost or written twice when they race. Concurrent flushes are
/// serialized by a second lock held across the write.
pub struct Exporter {
    buffer: Mutex<Vec<Snapshot>>,
    flush_guard: Mutex<()>,
    writer: Box<dyn ExportWriter>,
}

impl Exporter {
    #[must_use]
    pub fn new(writer: Box<dyn ExportWriter>) -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
            flush_guard: Mutex::new(()),
            writer,
        }
    }

    /// Append a snapshot to the buffer. Never fails.
    pub fn add(&self, snapshot: Snapshot) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot);
    }

    /// Write everything buffered so far as one batch. On failure the rows go
    /// back to the front of the buffer, ahead of anything added meanwhile.
    ///
    /// # Errors
    ///
    /// Returns the writer's `ExportError`; the buffer is left intact.
    pub fn flush(&self) -> Result<FlushReport, ExportError> {
        let _flushing = self
            .flush_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let batch = std::mem::take(
            &mut *self
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if batch.is_empty() {
            return Ok(FlushReport {
                rows: 0,
                path: None,
            });
        }

        match self.writer.write_batch(Utc::now(), &batch) {
            Ok(path) => {
                tracing::debug!("Exported {} snapshot(s) to {}", batch.len(), path.display());
                Ok(FlushReport {
                    rows: batch.len(),
                    path: Some(path),
                })
            }
            Err(e) => {
                let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
                let newer = std::mem::replace(&mut *buffer, batch);
                buffer.extend(newer);
                Err(e)
            }
        }
    }

    /// Snapshots waiting for the next flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
