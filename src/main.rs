use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use hostwatch::application::config::AppConfig;
use hostwatch::application::services::controller::{Controller, ExitReason};
use hostwatch::application::services::exporter::Exporter;
use hostwatch::domain::ports::sink::Sink;
use hostwatch::domain::value_objects::rotation::RotationPolicy;
use hostwatch::domain::value_objects::thresholds::ThresholdSet;
use hostwatch::infrastructure::collectors::sysinfo_collector::SysinfoSource;
use hostwatch::infrastructure::export::CsvSnapshotWriter;
use hostwatch::infrastructure::logging::{LoggingOptions, init_tracing};
use hostwatch::infrastructure::sinks::{CompositeSink, ConsoleSink, LogRotator};
use hostwatch::presentation::cli::app::{Cli, Commands};
use hostwatch::presentation::cli::commands::config::run_config;
use hostwatch::presentation::cli::commands::daemon::run_daemon;
use hostwatch::presentation::cli::commands::status::run_status;

const EXIT_STARTUP_FAILURE: u8 = 1;
const EXIT_SAMPLER_FAILED: u8 = 2;

fn print_banner() {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  hostwatch — host monitoring agent".bold().cyan());
    println!("{}", "━".repeat(40).cyan());
}

fn load_config(cli: &Cli) -> anyhow::Result<(AppConfig, PathBuf)> {
    if let Some(ref path) = cli.config {
        let config = AppConfig::load_from(path)
            .with_context(|| format!("Cannot load config from {}", path.display()))?;
        Ok((config, path.clone()))
    } else {
        let path = AppConfig::config_path()?;
        Ok((AppConfig::load_or_create(&path)?, path))
    }
}

async fn warmed_up_source() -> anyhow::Result<SysinfoSource> {
    tokio::task::spawn_blocking(SysinfoSource::warmed_up)
        .await
        .context("Metrics source initialisation panicked")
}

async fn start_daemon(cli: &Cli, config: &AppConfig) -> anyhow::Result<ExitCode> {
    let rotator = if config.enable_file_output {
        let path = cli.log_file_path();
        let rotator = LogRotator::open(&path, RotationPolicy::from(&config.log_rotation))
            .with_context(|| format!("Cannot open log file {}", path.display()))?;
        Some(Arc::new(rotator))
    } else {
        None
    };

    init_tracing(LoggingOptions {
        level: config.log_level,
        verbose: cli.verbose,
        console: config.enable_console_output,
        file: rotator.clone(),
    })?;

    // Concrete adapters are only named here
    let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();
    if config.enable_console_output {
        sinks.push(Arc::new(ConsoleSink::new()));
    }
    if let Some(rotator) = rotator {
        sinks.push(rotator);
    }
    let sink: Arc<dyn Sink> = Arc::new(CompositeSink::new(sinks, config.log_level));

    let exporter = config.data_export.enable_csv_export.then(|| {
        Arc::new(Exporter::new(Box::new(CsvSnapshotWriter::new(
            config.data_export.directory(),
        ))))
    });

    let source = warmed_up_source().await?;
    print_banner();
    let controller = Controller::new(config, Arc::new(source), sink, exporter);
    let report = run_daemon(controller).await;

    Ok(match report.reason {
        ExitReason::Stopped => ExitCode::SUCCESS,
        ExitReason::SamplerFailed => ExitCode::from(EXIT_SAMPLER_FAILED),
    })
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, config_source) = load_config(&cli)?;

    match cli.command {
        Some(Commands::Status { json }) => {
            init_tracing(LoggingOptions {
                level: config.log_level,
                verbose: cli.verbose,
                console: true,
                file: None,
            })?;
            let source = warmed_up_source().await?;
            run_status(&source, &ThresholdSet::from(&config), json)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config { path }) => {
            run_config(&config, &config_source, path)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Daemon) | None => start_daemon(&cli, &config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}
