//! Summary statistics computed once a run has finished.
//!
//! [`generate_statistics`] is a pure function over the [`ResultsLog`]. Servers
//! without a single completed request are left out of the output.

use std::time::Duration;

use hdrhistogram::Histogram;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::loadtest::metrics::{ErrorTally, ResultsLog, ServerLog, STATUS_OK};

/// Read-only summary of one server's run. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerStats {
    /// Arithmetic mean of completed-request durations.
    pub mean_time: f64,
    /// Median duration (mean of the two middle values for even counts).
    pub median_time: f64,
    /// Sample standard deviation, 0 with fewer than two samples.
    pub std_dev: f64,
    /// Fastest completed request.
    pub min_time: f64,
    /// Slowest completed request.
    pub max_time: f64,
    /// 95th percentile duration.
    pub p95_time: f64,
    /// 99th percentile duration.
    pub p99_time: f64,
    /// Snapshot of the status/error tally.
    pub status_codes: ErrorTally,
    /// Number of distinct tally tags other than `status_200`.
    pub error_count: u64,
    /// Percentage of completed requests that returned 200.
    pub success_rate: f64,
}

/// Summaries keyed by server name, in configuration order.
pub type SummaryStats = IndexMap<String, ServerStats>;

/// Computes one [`ServerStats`] per server that recorded at least one duration.
pub fn generate_statistics(results: &ResultsLog) -> SummaryStats {
    results
        .iter()
        .filter_map(|(name, log)| server_stats(log).map(|stats| (name.clone(), stats)))
        .collect()
}

/// Computes the summary for a single server, `None` if it has no durations.
pub fn server_stats(log: &ServerLog) -> Option<ServerStats> {
    if log.times.is_empty() {
        return None;
    }
    let secs: Vec<f64> = log.times.iter().map(Duration::as_secs_f64).collect();
    let (p95_time, p99_time) = percentiles(&log.times);

    let error_count = log
        .tally
        .iter()
        .filter(|(tag, _)| !tag.starts_with(STATUS_OK))
        .count() as u64;

    Some(ServerStats {
        mean_time: mean(&secs),
        median_time: median(&secs),
        std_dev: std_dev(&secs),
        min_time: secs.iter().copied().fold(f64::INFINITY, f64::min),
        max_time: secs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        p95_time,
        p99_time,
        status_codes: log.tally.clone(),
        error_count,
        success_rate: success_rate(log),
    })
}

/// `100 * status_200 / times.len()`, 0 when no durations were recorded.
pub fn success_rate(log: &ServerLog) -> f64 {
    if log.times.is_empty() {
        return 0.0;
    }
    log.tally.get(STATUS_OK) as f64 / log.times.len() as f64 * 100.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// P95 and P99 in seconds from a microsecond-resolution histogram.
fn percentiles(times: &[Duration]) -> (f64, f64) {
    let Ok(mut histogram) = Histogram::<u64>::new(3) else {
        return (0.0, 0.0);
    };
    histogram.auto(true);
    let mut rejected = 0usize;
    for time in times {
        let micros = u64::try_from(time.as_micros()).unwrap_or(u64::MAX);
        if histogram.record(micros).is_err() {
            rejected += 1;
        }
    }
    if rejected > 0 {
        debug!(rejected, "durations left out of the percentile histogram");
    }
    if histogram.is_empty() {
        return (0.0, 0.0);
    }
    let to_secs = |q: f64| histogram.value_at_quantile(q) as f64 / 1_000_000.0;
    (to_secs(0.95), to_secs(0.99))
}
