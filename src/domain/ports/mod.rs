pub mod collector;
pub mod export;
pub mod sink;

pub use collector::{CollectionError, MetricsSource};
pub use export::{ExportError, ExportWriter};
pub use sink::{Sink, SinkError};
