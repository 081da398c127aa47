//! JSON statistics report.
//!
//! The report is the full [`SummaryStats`] mapping, pretty-printed, written
//! to `load_test_stats_<YYYYMMDD_HHMMSS>.json` using local time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};

use crate::loadtest::error::LoadTestError;
use crate::loadtest::stats::SummaryStats;

/// Generate the report filename for a given timestamp.
pub fn report_filename<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("load_test_stats_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write the statistics report into `dir`, creating the directory if needed.
///
/// Returns the path to the written report file.
pub fn write_report(stats: &SummaryStats, dir: &Path) -> Result<PathBuf, LoadTestError> {
    write_report_at(stats, dir, &Local::now())
}

/// Like [`write_report`] with an explicit timestamp for the filename.
pub fn write_report_at<Tz: TimeZone>(
    stats: &SummaryStats,
    dir: &Path,
    timestamp: &DateTime<Tz>,
) -> Result<PathBuf, LoadTestError>
where
    Tz::Offset: std::fmt::Display,
{
    let report_path = dir.join(report_filename(timestamp));
    let io_err = |source: std::io::Error| LoadTestError::ReportIo {
        source,
        path: report_path.display().to_string(),
    };

    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }

    let json =
        serde_json::to_string_pretty(stats).map_err(|e| io_err(std::io::Error::other(e)))?;
    std::fs::write(&report_path, json).map_err(io_err)?;

    Ok(report_path)
}
