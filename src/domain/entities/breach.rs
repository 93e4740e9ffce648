use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::network::format_rate;
use crate::domain::value_objects::severity::Severity;

/// Metric family a breach was raised for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Network,
    ProcessCpu,
    ProcessMemory,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Memory => write!(f, "memory"),
            Self::Disk => write!(f, "disk"),
            Self::Network => write!(f, "network"),
            Self::ProcessCpu => write!(f, "process_cpu"),
            Self::ProcessMemory => write!(f, "process_memory"),
        }
    }
}

impl MetricKind {
    /// Whether the observed value is a byte rate rather than a percentage.
    #[must_use]
    pub const fn is_rate(self) -> bool {
        matches!(self, Self::Network)
    }
}

/// What a breach applies to: the whole host, a mount, an interface or a process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Scope {
    Global,
    Disk(String),
    #[serde(rename = "iface")]
    Interface(String),
    #[serde(rename = "pid")]
    Process(u32),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Disk(mount) => write!(f, "disk:{mount}"),
            Self::Interface(name) => write!(f, "iface:{name}"),
            Self::Process(pid) => write!(f, "pid:{pid}"),
        }
    }
}

/// One metric/scope observation at or above its threshold in one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breach {
    pub metric_kind: MetricKind,
    pub scope: Scope,
    pub observed_value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    /// Display name of the subject when the scope id alone is opaque (process name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Breach {
    /// Cooldown key of this breach.
    #[must_use]
    pub fn key(&self) -> (MetricKind, Scope) {
        (self.metric_kind, self.scope.clone())
    }

    /// One-line description used as alert message.
    #[must_use]
    pub fn describe(&self) -> String {
        let subject = match (&self.scope, &self.label) {
            (Scope::Process(pid), Some(name)) => format!("{name} (pid {pid})"),
            (scope, _) => scope.to_string(),
        };
        if self.metric_kind.is_rate() {
            format!(
                "{} {} on {subject}: {} >= {}",
                self.severity,
                self.metric_kind,
                format_rate(self.observed_value),
                format_rate(self.threshold),
            )
        } else {
            format!(
                "{} {} on {subject}: {:.1}% >= {:.1}%",
                self.severity, self.metric_kind, self.observed_value, self.threshold,
            )
        }
    }
}
