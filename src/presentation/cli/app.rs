use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hostwatch: continuous host monitoring agent
///
/// Samples CPU, memory, disk, network and process metrics, raises
/// rate-limited alerts, keeps rotated log files and exports samples to CSV.
#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute (defaults to `daemon`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log file written when file output is enabled
    #[arg(long, global = true, default_value = "logs/hostwatch.log")]
    pub log_file: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitoring agent
    #[command(alias = "d")]
    Daemon,

    /// Sample once and show current system status
    #[command(alias = "s")]
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    #[command(alias = "c")]
    Config {
        /// Print the config file location instead
        #[arg(short, long)]
        path: bool,
    },
}

impl Cli {
    /// The log file path with `~` expanded.
    #[must_use]
    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_file).as_ref())
    }
}
