pub mod composite;
pub mod console;
pub mod rotating_file;

pub use composite::CompositeSink;
pub use console::ConsoleSink;
pub use rotating_file::LogRotator;
