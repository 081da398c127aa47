//! Terminal summary renderer for load test statistics.
//!
//! [`render_summary`] is a pure function: it takes the computed statistics and
//! returns a formatted [`String`]. Color coding uses the `colored` crate,
//! which respects `colored::control::set_override(false)` when `--no-color`
//! is active or stdout is piped.
//!
//! # Layout
//!
//! ```text
//! Detailed Statistics:
//!
//! NGINX:
//!   Mean response time..........: 0.051 seconds
//!   Median response time........: 0.050 seconds
//!   Min time....................: 0.048 seconds
//!   Max time....................: 0.060 seconds
//!   Standard deviation..........: 0.004 seconds
//!   P95 / P99...................: 0.058 / 0.060 seconds
//!   Success rate................: 100.0%
//!   Status Codes................: status_200=100
//!   Total Errors................: 0
//! ```

use colored::Colorize;

use crate::loadtest::stats::{ServerStats, SummaryStats};

/// Width for dotted metric row padding.
const PAD_WIDTH: usize = 28;

/// Render the per-server statistics report.
pub fn render_summary(stats: &SummaryStats) -> String {
    let mut lines = vec![String::new(), "Detailed Statistics:".bold().to_string()];

    if stats.is_empty() {
        lines.push(String::new());
        lines.push("No server completed a single request.".red().to_string());
    }

    for (server, stat) in stats {
        lines.push(String::new());
        lines.push(format!("{}:", server.to_uppercase()).bold().to_string());
        lines.extend(render_server(stat));
    }

    lines.join("\n")
}

fn render_server(stat: &ServerStats) -> Vec<String> {
    let mut rows = vec![
        format_metric_row("Mean response time", &seconds(stat.mean_time)),
        format_metric_row("Median response time", &seconds(stat.median_time)),
        format_metric_row("Min time", &seconds(stat.min_time)),
        format_metric_row("Max time", &seconds(stat.max_time)),
        format_metric_row("Standard deviation", &seconds(stat.std_dev)),
        format_metric_row(
            "P95 / P99",
            &format!("{:.3} / {:.3} seconds", stat.p95_time, stat.p99_time),
        ),
    ];

    let rate = format!("{:.1}%", stat.success_rate);
    let rate = if stat.success_rate >= 99.0 {
        rate.green().to_string()
    } else if stat.success_rate >= 90.0 {
        rate.yellow().to_string()
    } else {
        rate.red().to_string()
    };
    rows.push(format_metric_row("Success rate", &rate));

    let codes = stat
        .status_codes
        .iter()
        .map(|(tag, count)| format!("{tag}={count}"))
        .collect::<Vec<_>>()
        .join("  ");
    rows.push(format_metric_row("Status Codes", &codes));

    let errors = stat.error_count.to_string();
    let errors = if stat.error_count > 0 {
        errors.red().to_string()
    } else {
        errors
    };
    rows.push(format_metric_row("Total Errors", &errors));

    rows
}

fn seconds(value: f64) -> String {
    format!("{value:.3} seconds")
}

/// Format a single metric row with dot-padding.
///
/// Produces: `"  metric_name..................: value_string"`
fn format_metric_row(name: &str, value: &str) -> String {
    let pad_width = PAD_WIDTH;
    format!("  {name:.<pad_width$}: {value}")
}
