use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use crate::domain::ports::sink::{Sink, SinkError};
use crate::domain::value_objects::log_level::LogLevel;

/// Colored single-line entries on stdout.
#[derive(Default)]
pub struct ConsoleSink {
    closed: AtomicBool,
}

impl ConsoleSink {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
        }
    }
}

impl Sink for ConsoleSink {
    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }
        println!("{}", render(level, message));
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

fn render(level: LogLevel, message: &str) -> String {
    format!(
        "{} {} {}",
        chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed(),
        level_badge(level),
        sanitize(message)
    )
}

/// Strip control characters so metric labels (process names) cannot
/// inject terminal escape sequences.
fn sanitize(s: &str) -> Cow<'_, str> {
    if s.bytes()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F))
    {
        Cow::Owned(
            s.chars()
                .filter(|&c| !matches!(c as u32, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F))
                .collect(),
        )
    } else {
        Cow::Borrowed(s)
    }
}

#[must_use]
fn level_badge(level: LogLevel) -> String {
    let label = format!(" {level} ");
    match level {
        LogLevel::Critical => label.on_red().white().bold().to_string(),
        LogLevel::Error => label.red().bold().to_string(),
        LogLevel::Warning => label.on_yellow().black().bold().to_string(),
        LogLevel::Info => label.cyan().to_string(),
        LogLevel::Debug => label.dimmed().to_string(),
    }
}
