use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::value_objects::log_level::LogLevel;
use crate::infrastructure::sinks::rotating_file::{LogRotator, ROTATION_LOG_TARGET};

/// Where diagnostic output goes.
pub struct LoggingOptions {
    pub level: LogLevel,
    pub verbose: bool,
    pub console: bool,
    pub file: Option<Arc<LogRotator>>,
}

fn env_filter(level: LogLevel, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.filter_directive()))
}

/// Install the global subscriber: an optional stderr layer and an optional
/// layer writing through the rotating log file.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(options: LoggingOptions) -> Result<()> {
    let console_layer = options
        .console
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    // The rotator reports its own failures under ROTATION_LOG_TARGET; routing
    // those back into the rotator would re-enter it.
    let file_layer = options.file.map(|rotator| {
        tracing_subscriber::fmt::layer()
            .with_writer(rotator)
            .with_ansi(false)
            .with_filter(filter_fn(|meta| meta.target() != ROTATION_LOG_TARGET))
    });

    tracing_subscriber::registry()
        .with(env_filter(options.level, options.verbose))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}
