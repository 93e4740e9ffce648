use crate::domain::entities::breach::{Breach, MetricKind, Scope};
use crate::domain::entities::process::ProcessSample;
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::ThresholdSet;

use super::Rule;

/// Processes over the CPU or memory limit. CPU breaches come first, then
/// memory breaches; each group is ordered by usage descending, PID ascending.
pub struct ProcessUsageRule;

fn offenders<'a>(
    processes: &'a [ProcessSample],
    usage: impl Fn(&ProcessSample) -> f64,
    threshold: f64,
) -> Vec<&'a ProcessSample> {
    let mut hits: Vec<&ProcessSample> = processes
        .iter()
        .filter(|p| usage(*p) >= threshold)
        .collect();
    hits.sort_by(|a, b| usage(*b).total_cmp(&usage(*a)).then(a.pid.cmp(&b.pid)));
    hits
}

fn breach_for(
    snapshot: &Snapshot,
    process: &ProcessSample,
    metric_kind: MetricKind,
    observed: f64,
    threshold: f64,
) -> Breach {
    Breach {
        metric_kind,
        scope: Scope::Process(process.pid),
        observed_value: observed,
        threshold,
        severity: Severity::for_percent(observed, threshold),
        timestamp: snapshot.timestamp,
        label: Some(process.name.clone()),
    }
}

impl Rule for ProcessUsageRule {
    fn name(&self) -> &'static str {
        "process_usage"
    }

    fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach> {
        let cpu = offenders(&snapshot.processes, |p| p.cpu_percent, thresholds.process_cpu)
            .into_iter()
            .map(|p| {
                breach_for(
                    snapshot,
                    p,
                    MetricKind::ProcessCpu,
                    p.cpu_percent,
                    thresholds.process_cpu,
                )
            });

        let memory = offenders(
            &snapshot.processes,
            |p| p.memory_percent,
            thresholds.process_memory,
        )
        .into_iter()
        .map(|p| {
            breach_for(
                snapshot,
                p,
                MetricKind::ProcessMemory,
                p.memory_percent,
                thresholds.process_memory,
            )
        });

        cpu.chain(memory).collect()
    }
}
