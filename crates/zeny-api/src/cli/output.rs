//! Shared terminal output helpers: spinners, notices, and formatting.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Start a steady-ticking spinner with the given message.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(template);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn success(message: &str) {
    println!();
    println!("  {} {message}", style("✓").green().bold());
    println!();
}

pub fn info(message: &str) {
    println!();
    println!("  {} {message}", style("i").blue().bold());
    println!();
}

/// Transient failure notice. Goes to stderr.
pub fn failure(message: &str) {
    eprintln!();
    eprintln!("  {} {message}", style("!").red().bold());
    eprintln!();
}

/// Local-time rendering for tables.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_truncate_flattens_newlines() {
        assert_eq!(truncate("line one\nline two", 40), "line one line two");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("héllo wörld", 6), "héllo…");
    }
}
