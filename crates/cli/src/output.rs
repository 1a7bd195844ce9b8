//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use monitor_lib::LogFormat;
use tabled::{settings::Style, Table, Tabled};

/// Format of the diagnostic log stream on stderr
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable text (default)
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Print a rounded table, or a placeholder when there are no rows
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a bold heading with an underline
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a bold section title with a thin rule
pub fn print_section(title: &str) {
    println!("{}", title.bold());
    println!("{}", "-".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a failure line on stdout, alongside successes
pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print an indented bullet
pub fn print_bullet(message: &str) {
    println!("   • {}", message);
}

/// Format whole currency units
pub fn format_currency(units: i64, currency: &str) -> String {
    match currency {
        "USD" => format!("${}", units),
        "EUR" => format!("€{}", units),
        "GBP" => format!("£{}", units),
        _ => format!("{} {}", units, currency),
    }
}

/// Format a threshold fraction as a percentage, e.g. `0.75` as `75%`
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Capitalize the first letter of every word and lowercase the rest, where
/// any non-alphabetic character starts a new word (`user_flow` becomes
/// `User_Flow`)
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(ch);
            word_start = true;
        }
    }
    out
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "pass" | "created" | "updated" => status.green().to_string(),
        "fail" | "failed" => status.red().to_string(),
        "skipped" | "warning" => status.yellow().to_string(),
        _ => status.to_string(),
    }
}

/// Green `PASS` or red `FAIL`
pub fn pass_fail(passed: bool) -> String {
    if passed {
        color_status("PASS")
    } else {
        color_status("FAIL")
    }
}
