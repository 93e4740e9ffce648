pub mod disk_collector;
pub mod network_collector;
pub mod sysinfo_collector;
