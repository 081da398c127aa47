//! Per-server result logs and status/error tallies.
//!
//! Request futures never touch shared state. Each returns a [`RequestOutcome`]
//! and the dispatch loop merges outcomes into the owning [`ServerLog`] once
//! the batch barrier has been passed.
//!
//! # Recording asymmetry
//!
//! Completed requests append to `times`, `status_codes` and `sizes`. Failed
//! requests append only to `errors`. The lengths of `times` and `errors` are
//! therefore independent counts, and `times.len()` is the denominator for the
//! success rate.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;

use crate::loadtest::client::size_matches;
use crate::loadtest::error::RequestError;

/// Tally key for payloads whose size is outside the tolerance.
pub const SIZE_MISMATCH: &str = "size_mismatch";

/// Tally key prefix for HTTP statuses, e.g. `status_200`.
pub const STATUS_PREFIX: &str = "status_";

/// Tally key of a successful response.
pub const STATUS_OK: &str = "status_200";

/// Result of a single request, before it is merged into a [`ServerLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The response body was fully read, whatever the status.
    Completed {
        /// Wall-clock time from send to last body byte.
        duration: Duration,
        /// HTTP status code.
        status: u16,
        /// Body length in bytes.
        size: u64,
    },
    /// The request did not complete.
    Failed(RequestError),
}

/// Counter mapping status/error tags to occurrence counts.
///
/// Keys keep first-seen order so reports list them in the order they occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorTally(IndexMap<String, u64>);

impl ErrorTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `tag`.
    pub fn increment(&mut self, tag: &str) {
        *self.0.entry(tag.to_owned()).or_insert(0) += 1;
    }

    /// Returns the count for `tag`, 0 if never seen.
    pub fn get(&self, tag: &str) -> u64 {
        self.0.get(tag).copied().unwrap_or(0)
    }

    /// Iterates `(tag, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Append-only record of everything observed for one server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerLog {
    /// Durations of completed requests, in completion-merge order.
    pub times: Vec<Duration>,
    /// Status codes of completed requests.
    pub status_codes: Vec<u16>,
    /// Body sizes of completed requests.
    pub sizes: Vec<u64>,
    /// Error strings of failed requests.
    pub errors: Vec<String>,
    /// Status and error tallies.
    pub tally: ErrorTally,
}

impl ServerLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one request outcome.
    ///
    /// `expected_size` and `tolerance` decide whether a completed response
    /// also counts as a `size_mismatch`. The mismatch is counted on top of
    /// the status tally, never instead of it.
    pub fn record(&mut self, outcome: RequestOutcome, expected_size: u64, tolerance: u64) {
        match outcome {
            RequestOutcome::Completed {
                duration,
                status,
                size,
            } => {
                self.times.push(duration);
                self.status_codes.push(status);
                self.sizes.push(size);
                self.tally.increment(&format!("{STATUS_PREFIX}{status}"));
                if !size_matches(size, expected_size, tolerance) {
                    self.tally.increment(SIZE_MISMATCH);
                }
            },
            RequestOutcome::Failed(err) => {
                self.tally.increment(err.tag());
                self.errors.push(err.to_string());
            },
        }
    }

    /// Number of requests merged so far, completed or failed.
    pub fn attempted(&self) -> usize {
        self.times.len() + self.errors.len()
    }
}

/// Results of a whole run, keyed by server name in configuration order.
pub type ResultsLog = IndexMap<String, ServerLog>;
