use crate::domain::entities::breach::{Breach, MetricKind, Scope};
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::ThresholdSet;

use super::Rule;

/// One independent check per mount, in the order the source reported them.
pub struct DiskUsageRule;

impl Rule for DiskUsageRule {
    fn name(&self) -> &'static str {
        "disk_usage"
    }

    fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach> {
        snapshot
            .disks
            .iter()
            .filter(|disk| disk.usage_percent >= thresholds.disk)
            .map(|disk| Breach {
                metric_kind: MetricKind::Disk,
                scope: Scope::Disk(disk.mount_point.clone()),
                observed_value: disk.usage_percent,
                threshold: thresholds.disk,
                severity: Severity::for_percent(disk.usage_percent, thresholds.disk),
                timestamp: snapshot.timestamp,
                label: None,
            })
            .collect()
    }
}
