pub mod log_level;
pub mod rotation;
pub mod severity;
pub mod thresholds;

pub use log_level::LogLevel;
pub use rotation::RotationPolicy;
pub use severity::Severity;
pub use thresholds::ThresholdSet;
