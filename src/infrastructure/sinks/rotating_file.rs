use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::domain::ports::sink::{Sink, SinkError};
use crate::domain::value_objects::log_level::LogLevel;
use crate::domain::value_objects::rotation::RotationPolicy;

/// `tracing` target of rotation failure events. The file layer filters it
/// out because the rotator writes those entries to the file itself.
pub const ROTATION_LOG_TARGET: &str = "hostwatch::rotation";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum RotationError {
    #[error("cannot remove oldest backup {path}: {reason}")]
    Discard { path: PathBuf, reason: String },
    #[error("cannot rename {from} to {to}: {reason}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
    #[error("cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("cannot truncate {path}: {reason}")]
    Truncate { path: PathBuf, reason: String },
}

/// Failures to report once the state lock is released.
#[derive(Default)]
struct RotationOutcome {
    failure: Option<RotationError>,
    reopen_failure: Option<RotationError>,
}

struct LogFileState {
    file: Option<File>,
    size: u64,
    rotations: u64,
    closed: bool,
    failure_reported: bool,
}

/// Size-bounded log file with numbered backups (`name.1` newest).
///
/// Every write and every rotation happens under one lock, so concurrent
/// writers never interleave with a rotation and the size count stays exact.
/// A rotation runs after the write that pushes the file past the limit.
pub struct LogRotator {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<LogFileState>,
}

impl LogRotator {
    /// Open (or create) the active file in append mode, creating parent
    /// directories. The current file length counts toward the limit.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::WriteFailed` if the directory or file cannot be
    /// created.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SinkError::WriteFailed(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let file = open_append(&path).map_err(|e| SinkError::WriteFailed(e.to_string()))?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path,
            policy,
            state: Mutex::new(LogFileState {
                file: Some(file),
                size,
                rotations: 0,
                closed: false,
                failure_reported: false,
            }),
        })
    }

    /// Append one complete entry, rotating afterwards if the file is now
    /// over the limit. A failed rotation never fails the write.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Closed` after `close`, or `SinkError::WriteFailed`
    /// if the entry itself cannot be written.
    pub fn write_entry(&self, entry: &[u8]) -> Result<(), SinkError> {
        let outcome = {
            let mut state = self.lock()?;
            if state.closed {
                return Err(SinkError::Closed);
            }
            if state.file.is_none() {
                self.reopen(&mut state)
                    .map_err(|e| SinkError::WriteFailed(e.to_string()))?;
            }
            let file = state.file.as_mut().ok_or(SinkError::Closed)?;
            file.write_all(entry)
                .map_err(|e| SinkError::WriteFailed(e.to_string()))?;
            state.size += entry.len() as u64;

            if state.size > self.policy.max_size_bytes {
                self.rotate_or_recover(&mut state)
            } else {
                RotationOutcome::default()
            }
        };

        if let Some(e) = outcome.reopen_failure {
            tracing::debug!(target: ROTATION_LOG_TARGET, "Reopening active log failed: {e}");
        }
        if let Some(e) = outcome.failure {
            tracing::error!(target: ROTATION_LOG_TARGET, "Log rotation failed, writing without rotation: {e}");
        }
        Ok(())
    }

    /// Bytes in the active file.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::WriteFailed` if the state lock is poisoned.
    pub fn current_size(&self) -> Result<u64, SinkError> {
        Ok(self.lock()?.size)
    }

    /// Completed rotations since `open`.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::WriteFailed` if the state lock is poisoned.
    pub fn rotations(&self) -> Result<u64, SinkError> {
        Ok(self.lock()?.rotations)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of backup number `index` (`name.index`).
    #[must_use]
    pub fn backup_path(&self, index: u32) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LogFileState>, SinkError> {
        self.state
            .lock()
            .map_err(|e| SinkError::WriteFailed(format!("lock poisoned: {e}")))
    }

    /// The rotation failure is reported once per failure streak. Nothing is
    /// logged here: the caller holds the state lock.
    fn rotate_or_recover(&self, state: &mut LogFileState) -> RotationOutcome {
        match self.rotate(state) {
            Ok(()) => {
                state.failure_reported = false;
                RotationOutcome::default()
            }
            Err(e) => {
                let reopen_failure = if state.file.is_none() {
                    self.reopen(state).err()
                } else {
                    None
                };
                if state.failure_reported {
                    return RotationOutcome {
                        failure: None,
                        reopen_failure,
                    };
                }
                state.failure_reported = true;
                if let Some(file) = state.file.as_mut() {
                    let line = format_line(
                        LogLevel::Error,
                        &format!("Log rotation failed, writing without rotation: {e}"),
                    );
                    if file.write_all(line.as_bytes()).is_ok() {
                        state.size += line.len() as u64;
                    }
                }
                RotationOutcome {
                    failure: Some(e),
                    reopen_failure,
                }
            }
        }
    }

    fn rotate(&self, state: &mut LogFileState) -> Result<(), RotationError> {
        if self.policy.backup_count == 0 {
            let file = state.file.as_mut().ok_or_else(|| RotationError::Truncate {
                path: self.path.clone(),
                reason: "file not open".to_string(),
            })?;
            file.set_len(0).map_err(|e| RotationError::Truncate {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        } else {
            if let Some(mut file) = state.file.take() {
                let _ = file.flush();
            }

            let oldest = self.backup_path(self.policy.backup_count);
            if oldest.exists() {
                std::fs::remove_file(&oldest).map_err(|e| RotationError::Discard {
                    path: oldest.clone(),
                    reason: e.to_string(),
                })?;
            }
            for index in (1..self.policy.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    rename(&from, &self.backup_path(index + 1))?;
                }
            }
            rename(&self.path, &self.backup_path(1))?;

            state.file = Some(open_append(&self.path)?);
        }

        state.size = 0;
        state.rotations += 1;
        Ok(())
    }

    fn reopen(&self, state: &mut LogFileState) -> Result<(), RotationError> {
        let file = open_append(&self.path)?;
        state.size = file.metadata().map(|m| m.len()).unwrap_or(state.size);
        state.file = Some(file);
        Ok(())
    }
}

impl Sink for LogRotator {
    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        self.write_entry(format_line(level, message).as_bytes())
    }

    fn close(&self) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        state.closed = true;
        if let Some(mut file) = state.file.take() {
            file.flush()
                .map_err(|e| SinkError::WriteFailed(e.to_string()))?;
        }
        Ok(())
    }
}

/// Lets a `tracing-subscriber` fmt layer write through the rotator.
/// The fmt layer hands over each formatted event in one call.
impl Write for &LogRotator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_entry(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn format_line(level: LogLevel, message: &str) -> String {
    format!(
        "{} - {level} - {message}\n",
        chrono::Local::now().format(TIMESTAMP_FORMAT)
    )
}

fn open_append(path: &Path) -> Result<File, RotationError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RotationError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn rename(from: &Path, to: &Path) -> Result<(), RotationError> {
    std::fs::rename(from, to).map_err(|e| RotationError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: e.to_string(),
    })
}
