pub mod collectors;
pub mod export;
pub mod logging;
pub mod sinks;
