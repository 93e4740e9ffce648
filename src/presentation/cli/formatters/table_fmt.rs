use colored::Colorize;

use crate::domain::entities::process::ProcessSample;

/// Formats the top N processes by CPU usage as an aligned table. Rows at or
/// above either per-process threshold are highlighted.
#[must_use]
pub fn format_process_table(
    processes: &[ProcessSample],
    top_n: usize,
    cpu_warn_at: f64,
    memory_warn_at: f64,
) -> String {
    let mut sorted: Vec<&ProcessSample> = processes.iter().collect();
    sorted.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| a.pid.cmp(&b.pid))
    });
    sorted.truncate(top_n);

    let header = format!("{:<8} {:<24} {:>7} {:>7}", "PID", "NAME", "CPU%", "MEM%");
    let separator = "─".repeat(header.chars().count());

    let mut rows = vec![header, separator];
    for p in sorted {
        let name: String = p.name.chars().take(23).collect();
        let row = format!(
            "{:<8} {:<24} {:>7.1} {:>7.1}",
            p.pid, name, p.cpu_percent, p.memory_percent
        );
        if p.cpu_percent >= cpu_warn_at || p.memory_percent >= memory_warn_at {
            rows.push(row.red().to_string());
        } else {
            rows.push(row);
        }
    }

    rows.join("\n")
}
