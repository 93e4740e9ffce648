pub mod alert_manager;
pub mod controller;
pub mod exporter;
pub mod monitor;
pub mod sampler;
