use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use crate::domain::entities::breach::Breach;
use crate::domain::entities::network::format_rate;
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::ports::collector::MetricsSource;
use crate::domain::rules::ThresholdEvaluator;
use crate::domain::value_objects::thresholds::ThresholdSet;
use crate::presentation::cli::formatters::breach_fmt::format_breaches;
use crate::presentation::cli::formatters::status_fmt::{
    colorize_percent, colorize_rate, format_bytes, print_section_header, progress_bar,
};
use crate::presentation::cli::formatters::table_fmt::format_process_table;

const TOP_PROCESSES: usize = 5;

/// JSON form of the `status` command.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub snapshot: Snapshot,
    pub breaches: Vec<Breach>,
}

/// Sample once, evaluate against the thresholds and print the result.
/// Never fires alerts.
///
/// # Errors
///
/// Returns an error if sampling or JSON serialization fails.
pub fn run_status(
    source: &dyn MetricsSource,
    thresholds: &ThresholdSet,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = source
        .sample()
        .context("Failed to collect system metrics")?;
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, thresholds);

    if json {
        let report = StatusReport { snapshot, breaches };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_snapshot(&snapshot, thresholds);
    println!();
    println!("{}", format_breaches(&breaches));
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot, thresholds: &ThresholdSet) {
    println!("{}", "hostwatch — System Status".bold().cyan());
    println!("{}", "━".repeat(50));

    let cpu = &snapshot.cpu;
    print_section_header("\nCPU");
    println!(
        "  {} {} ({} cores)",
        progress_bar(cpu.global_usage_percent, 30, thresholds.cpu),
        colorize_percent(cpu.global_usage_percent, thresholds.cpu),
        cpu.core_count()
    );

    let mem = &snapshot.memory;
    print_section_header("\nMemory");
    println!(
        "  {} {}",
        progress_bar(mem.usage_percent, 30, thresholds.memory),
        colorize_percent(mem.usage_percent, thresholds.memory)
    );
    println!(
        "  Used: {} / {}",
        format_bytes(mem.used_bytes),
        format_bytes(mem.total_bytes)
    );

    if !snapshot.disks.is_empty() {
        print_section_header("\nDisks");
        for disk in &snapshot.disks {
            println!(
                "  {:<20} {} {} ({} free)",
                disk.mount_point,
                progress_bar(disk.usage_percent, 20, thresholds.disk),
                colorize_percent(disk.usage_percent, thresholds.disk),
                format_bytes(disk.available_bytes)
            );
        }
    }

    if !snapshot.networks.is_empty() {
        print_section_header("\nNetwork");
        for net in &snapshot.networks {
            println!(
                "  {:<12} ↓ {}  ↑ {}",
                net.interface,
                colorize_rate(
                    format_rate(net.rx_bytes_per_sec),
                    net.rx_bytes_per_sec,
                    thresholds.network
                ),
                colorize_rate(
                    format_rate(net.tx_bytes_per_sec),
                    net.tx_bytes_per_sec,
                    thresholds.network
                )
            );
        }
    }

    print_section_header(&format!("\nTop {TOP_PROCESSES} processes (CPU)"));
    println!(
        "{}",
        format_process_table(
            &snapshot.processes,
            TOP_PROCESSES,
            thresholds.process_cpu,
            thresholds.process_memory
        )
    );
}
