use crate::domain::entities::breach::{Breach, MetricKind, Scope};
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::ThresholdSet;

use super::Rule;

pub struct MemoryUsageRule;

impl Rule for MemoryUsageRule {
    fn name(&self) -> &'static str {
        "memory_usage"
    }

    fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach> {
        let usage = snapshot.memory.usage_percent;

        if usage < thresholds.memory {
            return vec![];
        }

        vec![Breach {
            metric_kind: MetricKind::Memory,
            scope: Scope::Global,
            observed_value: usage,
            threshold: thresholds.memory,
            severity: Severity::for_percent(usage, thresholds.memory),
            timestamp: snapshot.timestamp,
            label: None,
        }]
    }
}
