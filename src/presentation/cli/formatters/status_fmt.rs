use colored::{ColoredString, Colorize};

/// Colour band of a percentage relative to its warning threshold: red at or
/// above it, yellow within 10 points below it, green otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Ok,
    Near,
    Over,
}

fn band(value: f64, warn_at: f64) -> Band {
    if value >= warn_at {
        Band::Over
    } else if value >= warn_at - 10.0 {
        Band::Near
    } else {
        Band::Ok
    }
}

fn paint(text: String, band: Band) -> ColoredString {
    match band {
        Band::Over => text.red().bold(),
        Band::Near => text.yellow(),
        Band::Ok => text.green(),
    }
}

#[must_use]
pub fn progress_bar(value: f64, width: usize, warn_at: f64) -> String {
    let ratio = (value / 100.0).clamp(0.0, 1.0);
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_filled = paint("█".repeat(filled), band(value, warn_at));
    format!("{bar_filled}{}", "░".repeat(empty))
}

#[must_use]
pub fn colorize_percent(value: f64, warn_at: f64) -> ColoredString {
    paint(format!("{value:.1}%"), band(value, warn_at))
}

/// A byte rate, red once it reaches `warn_at` bytes per second.
#[must_use]
pub fn colorize_rate(label: String, bytes_per_sec: f64, warn_at: f64) -> ColoredString {
    if bytes_per_sec >= warn_at {
        label.red().bold()
    } else {
        label.normal()
    }
}

#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    format!("{:.1} GiB", bytes as f64 / GIB)
}

pub fn print_section_header(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).cyan());
}
