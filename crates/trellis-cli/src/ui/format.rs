//! Formatting for sizes, durations and emitted-file summaries.

use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;
use trellis_output::EmitReport;

use super::{colors_enabled, is_ci};

/// ```
/// use trellis_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the files of one emitted bundle to stderr.
pub fn print_build_summary(label: &str, report: &EmitReport) {
    let width = if is_ci() {
        60
    } else {
        (Term::stderr().size().1 as usize).min(80)
    };
    let rule = "─".repeat(width);
    let color = colors_enabled();

    if color {
        eprintln!("\n{}", label.bold().underline());
    } else {
        eprintln!("\n{label}");
    }
    eprintln!("{rule}");

    for file in &report.files {
        let size = format_size(file.size as u64);
        if color {
            eprintln!(
                "  {} {} {} {}",
                "▸".blue(),
                file.file_name.bright_white().bold(),
                format!("({})", file.logical_name).dimmed(),
                size.dimmed()
            );
        } else {
            eprintln!("  ▸ {} ({}) {}", file.file_name, file.logical_name, size);
        }
    }
    if let Some(path) = &report.manifest_path {
        eprintln!("  manifest: {}", path.display());
    }

    eprintln!("{rule}");
    let total = format_size(report.total_size() as u64);
    if color {
        eprintln!("  {} {} in {} files", "Total:".bold(), total.green(), report.files.len());
    } else {
        eprintln!("  Total: {} in {} files", total, report.files.len());
    }
}
