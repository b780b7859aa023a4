//! Console output utilities.

use chrono::{Local, TimeZone};
use console::style;

use crate::command::StatusReport;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Threads Downloader                                ║
║     Rate-limited, resumable media downloads           ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(download_root: &str, state_file: &str, delay_ms: u64, cooldown_ms: u64) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Directory:  {}", download_root);
    println!("  State file: {}", state_file);
    println!(
        "  Pacing:     {}ms between files, {}s after every 100",
        delay_ms,
        cooldown_ms / 1000
    );
    println!();
}

/// Print a status report.
pub fn print_status(report: &StatusReport) {
    let state = if report.is_downloading {
        style("downloading").green()
    } else {
        style("idle").dim()
    };

    println!();
    println!("{}", style("Status:").bold());
    println!("  State:     {}", state);
    println!("  Progress:  {}/{}", report.download_count, report.total_files);
    println!("  Queued:    {}", report.queue_length);
    if let Some(until) = format_epoch_millis(report.cooldown_until) {
        println!("  Cooldown:  until {}", until);
    }
    println!(
        "  Saved:     {}",
        if report.has_saved_state {
            "yes (use `resume` to continue)"
        } else {
            "no"
        }
    );
    println!();
}

/// Local time of a Unix millisecond timestamp; `None` for 0.
fn format_epoch_millis(millis: i64) -> Option<String> {
    if millis <= 0 {
        return None;
    }
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|time| time.format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch_millis() {
        assert_eq!(format_epoch_millis(0), None);
        assert_eq!(format_epoch_millis(1_700_000_000_000).map(|s| s.len()), Some(8));
    }
}
