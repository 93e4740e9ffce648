use serde::{Deserialize, Serialize};

/// Warning thresholds the evaluator compares each snapshot against.
///
/// Percentages are in `0..=100`, `network` is a byte rate per second.
/// Every value is strictly positive; the configuration layer rejects
/// anything else before a `ThresholdSet` is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Aggregate CPU usage percentage
    pub cpu: f64,
    /// Memory usage percentage
    pub memory: f64,
    /// Usage percentage of any single mount
    pub disk: f64,
    /// Bytes per second in either direction on any single interface
    pub network: f64,
    /// CPU percentage of a single process
    pub process_cpu: f64,
    /// Memory percentage of a single process
    pub process_memory: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            memory: 80.0,
            disk: 90.0,
            network: 100.0 * 1024.0 * 1024.0,
            process_cpu: 50.0,
            process_memory: 10.0,
        }
    }
}

impl ThresholdSet {
    /// Returns the name of the first non-positive threshold, if any.
    #[must_use]
    pub fn first_invalid(&self) -> Option<&'static str> {
        [
            ("cpu", self.cpu),
            ("memory", self.memory),
            ("disk", self.disk),
            ("network", self.network),
            ("process_cpu", self.process_cpu),
            ("process_memory", self.process_memory),
        ]
        .into_iter()
        .find(|(_, value)| value.is_nan() || *value <= 0.0)
        .map(|(name, _)| name)
    }
}
