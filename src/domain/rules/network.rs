use crate::domain::entities::breach::{Breach, MetricKind, Scope};
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::ThresholdSet;

use super::Rule;

/// Per-interface throughput, comparing the busier direction to the threshold.
pub struct NetworkThroughputRule;

impl Rule for NetworkThroughputRule {
    fn name(&self) -> &'static str {
        "network_throughput"
    }

    fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach> {
        let mut breaches = Vec::new();
        for iface in &snapshot.networks {
            let rate = iface.peak_rate();
            if rate >= thresholds.network {
                breaches.push(Breach {
                    metric_kind: MetricKind::Network,
                    scope: Scope::Interface(iface.interface.clone()),
                    observed_value: rate,
                    threshold: thresholds.network,
                    severity: Severity::for_rate(rate, thresholds.network),
                    timestamp: snapshot.timestamp,
                    label: None,
                });
            }
        }
        breaches
    }
}
