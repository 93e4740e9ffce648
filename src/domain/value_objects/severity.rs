use serde::{Deserialize, Serialize};

use super::log_level::LogLevel;

/// Severity of a threshold breach
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl Severity {
    /// Classify a percentage reading. Critical starts halfway between the
    /// threshold and 100%.
    #[must_use]
    pub fn for_percent(observed: f64, threshold: f64) -> Self {
        let critical_from = threshold + (100.0 - threshold).max(0.0) / 2.0;
        if observed >= critical_from {
            Self::Critical
        } else {
            Self::Warning
        }
    }

    /// Classify a throughput reading. Critical starts at twice the threshold.
    #[must_use]
    pub fn for_rate(observed: f64, threshold: f64) -> Self {
        if observed >= threshold * 2.0 {
            Self::Critical
        } else {
            Self::Warning
        }
    }

    /// Log level used when an alert of this severity is written to a sink.
    #[must_use]
    pub const fn log_level(self) -> LogLevel {
        match self {
            Self::Warning => LogLevel::Warning,
            Self::Critical => LogLevel::Error,
        }
    }

    #[must_use]
    pub const fn color(&self) -> &str {
        match self {
            Self::Warning => "yellow",
            Self::Critical => "bright red",
        }
    }
}
