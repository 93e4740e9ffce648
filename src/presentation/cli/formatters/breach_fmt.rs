use colored::Colorize;

use crate::domain::entities::breach::Breach;
use crate::domain::value_objects::severity::Severity;

fn severity_badge(severity: Severity) -> String {
    let label = format!(" {severity} ");
    match severity {
        Severity::Critical => label.on_red().white().bold().to_string(),
        Severity::Warning => label.color(severity.color()).bold().to_string(),
    }
}

/// One line per breach, or a single "all clear" line.
#[must_use]
pub fn format_breaches(breaches: &[Breach]) -> String {
    if breaches.is_empty() {
        return "All metrics below their thresholds".green().bold().to_string();
    }
    breaches
        .iter()
        .map(|b| {
            let text: String = b.describe().chars().filter(|c| !c.is_control()).collect();
            format!("{} {text}", severity_badge(b.severity))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
