pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;

use crate::domain::entities::breach::Breach;
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::value_objects::thresholds::ThresholdSet;

/// A deterministic rule that compares a snapshot against thresholds.
/// Rules are pure functions: snapshot + thresholds in, breaches out. No I/O.
pub trait Rule: Send + Sync {
    /// Returns the unique name of this rule
    fn name(&self) -> &'static str;

    /// Evaluates the rule against a snapshot using the given thresholds
    fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach>;
}

/// Returns every rule in evaluation order: CPU, memory, disks, network
/// interfaces, processes.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(cpu::CpuUsageRule),
        Box::new(memory::MemoryUsageRule),
        Box::new(disk::DiskUsageRule),
        Box::new(network::NetworkThroughputRule),
        Box::new(process::ProcessUsageRule),
    ]
}

/// Runs a fixed sequence of rules against snapshots
pub struct ThresholdEvaluator {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ThresholdEvaluator {
    #[must_use]
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Evaluates every rule, concatenating their breaches in rule order.
    /// No rule short-circuits another and the result is not re-sorted.
    #[must_use]
    pub fn evaluate(&self, snapshot: &Snapshot, thresholds: &ThresholdSet) -> Vec<Breach> {
        self.rules
            .iter()
            .flat_map(|rule| rule.evaluate(snapshot, thresholds))
            .collect()
    }
}
