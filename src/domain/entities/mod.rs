pub mod alert;
pub mod breach;
pub mod disk;
pub mod network;
pub mod process;
pub mod snapshot;

pub use alert::{Alert, DeliveryChannels};
pub use breach::{Breach, MetricKind, Scope};
pub use disk::DiskInfo;
pub use network::NetworkInfo;
pub use process::ProcessSample;
pub use snapshot::{CpuInfo, MemoryInfo, Snapshot};
