use crate::domain::entities::breach::{Breach, MetricKind, Scope};
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::ThresholdSet;

use super::Rule;

/// Aggregate CPU usage. Per-core readings are informational only.
pub struct CpuUsageRule;

impl Rule for CpuUsageRule {
    fn name(&self) -> &'static str {
        "cpu_usage"
    }

    fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach> {
        let usage = snapshot.cpu.global_usage_percent;

        if usage >= thresholds.cpu {
            vec![Breach {
                metric_kind: MetricKind::Cpu,
                scope: Scope::Global,
                observed_value: usage,
                threshold: thresholds.cpu,
                severity: Severity::for_percent(usage, thresholds.cpu),
                timestamp: snapshot.timestamp,
                label: None,
            }]
        } else {
            vec![]
        }
    }
}
