//! Batch-synchronized load test execution.
//!
//! [`LoadTestEngine`] drives the whole run:
//! 1. Optional preflight size verification on its own HTTP session.
//! 2. Dispatch of `num_requests` per server in batches of
//!    `concurrent_requests` per server, on a second HTTP session.
//! 3. Merging of every request outcome into the per-server [`ServerLog`]s.
//!
//! All request futures of a batch are polled concurrently on the calling task
//! through [`futures::future::join_all`]; nothing is spawned. The next batch
//! is only built once every future of the current one has resolved, so batch
//! `N + 1` never overlaps batch `N`.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info};

use crate::loadtest::client::TargetClient;
use crate::loadtest::config::LoadTestConfig;
use crate::loadtest::display::ProgressSink;
use crate::loadtest::error::LoadTestError;
use crate::loadtest::metrics::{RequestOutcome, ResultsLog, ServerLog};
use crate::loadtest::preflight::{run_preflight, PreflightCheck};
use crate::loadtest::stats::{generate_statistics, SummaryStats};

/// Progress published after each completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Zero-based index of the batch that just finished.
    pub batch_index: usize,
    /// Total number of batches in the run.
    pub batch_count: usize,
    /// Requests sent to each server in this batch.
    pub batch_size: u32,
    /// Requests completed per server so far (the cumulative batch sizes).
    pub completed_per_server: u32,
    /// Total requests planned per server.
    pub total_per_server: u32,
}

/// Splits `num_requests` into batch sizes of at most `concurrent_requests`.
///
/// Only the last batch may be smaller. A zero batch size yields no batches.
pub fn plan_batches(num_requests: u32, concurrent_requests: u32) -> Vec<u32> {
    if concurrent_requests == 0 {
        return Vec::new();
    }
    (0..num_requests)
        .step_by(concurrent_requests as usize)
        .map(|start| concurrent_requests.min(num_requests - start))
        .collect()
}

/// Top-level load test engine configuration and entry point.
pub struct LoadTestEngine {
    config: LoadTestConfig,
    skip_preflight: bool,
}

impl LoadTestEngine {
    /// Creates a new engine with the given configuration.
    pub fn new(config: LoadTestConfig) -> Self {
        Self {
            config,
            skip_preflight: false,
        }
    }

    /// Skips the preflight size verification phase.
    pub fn with_skip_preflight(mut self, skip: bool) -> Self {
        self.skip_preflight = skip;
        self
    }

    /// Returns a reference to the engine's configuration.
    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Runs preflight (unless skipped) and the batched dispatch loop.
    ///
    /// Per-request failures never fail the run. Errors are returned only for
    /// invalid configuration, an HTTP client that cannot be built, or a
    /// transport failure during preflight.
    pub async fn run(
        &self,
        progress: &mut dyn ProgressSink,
    ) -> Result<LoadTestResult, LoadTestError> {
        self.config.validate()?;
        let settings = &self.config.settings;

        println!(
            "Starting load test with {} total requests per server",
            settings.num_requests
        );
        println!("Concurrent requests: {}", settings.concurrent_requests);

        let preflight = if self.skip_preflight {
            debug!("preflight skipped");
            Vec::new()
        } else {
            run_preflight(&self.config).await?
        };

        let test_start = Instant::now();
        let results = self.dispatch(progress).await?;
        let elapsed = test_start.elapsed();
        info!(elapsed_secs = elapsed.as_secs_f64(), "load test finished");

        Ok(LoadTestResult {
            results,
            preflight,
            elapsed,
        })
    }

    /// Dispatches every batch against every server on one shared session.
    async fn dispatch(
        &self,
        progress: &mut dyn ProgressSink,
    ) -> Result<ResultsLog, LoadTestError> {
        let settings = &self.config.settings;
        let client = TargetClient::new(settings.timeout_as_duration())?;

        let mut results: ResultsLog = self
            .config
            .server
            .iter()
            .map(|target| (target.name.clone(), ServerLog::new()))
            .collect();

        let batches = plan_batches(settings.num_requests, settings.concurrent_requests);
        let batch_count = batches.len();
        let mut completed_per_server = 0u32;

        for (batch_index, batch_size) in batches.into_iter().enumerate() {
            let tasks = self.config.server.iter().flat_map(|target| {
                let client = &client;
                (0..batch_size).map(move |_| async move {
                    (target.name.as_str(), client.fetch(&target.url).await)
                })
            });

            // Barrier: the whole batch resolves before the next one is built.
            let outcomes: Vec<(&str, RequestOutcome)> = join_all(tasks).await;

            for (server, outcome) in outcomes {
                if let Some(log) = results.get_mut(server) {
                    log.record(
                        outcome,
                        settings.expected_size_bytes,
                        settings.size_tolerance_bytes,
                    );
                }
            }

            completed_per_server += batch_size;
            debug!(batch_index, batch_size, completed_per_server, "batch complete");
            progress.batch_completed(&BatchProgress {
                batch_index,
                batch_count,
                batch_size,
                completed_per_server,
                total_per_server: settings.num_requests,
            });
        }

        progress.finish();
        Ok(results)
    }
}

/// Result of a completed load test run.
#[derive(Debug)]
pub struct LoadTestResult {
    /// Per-server logs in configuration order.
    pub results: ResultsLog,
    /// Preflight outcome per server (empty when skipped).
    pub preflight: Vec<PreflightCheck>,
    /// Wall-clock time of the dispatch phase.
    pub elapsed: Duration,
}

impl LoadTestResult {
    /// Computes the summary statistics for this run.
    pub fn statistics(&self) -> SummaryStats {
        generate_statistics(&self.results)
    }
}
