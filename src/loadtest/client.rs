//! HTTP session used by the preflight probe and the dispatch loop.
//!
//! [`TargetClient`] wraps one pooled [`reqwest::Client`]. Cloning it shares
//! the connection pool, so every request of a phase reuses the same session.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_LENGTH;
use reqwest::StatusCode;

use crate::loadtest::error::{LoadTestError, RequestError};
use crate::loadtest::metrics::RequestOutcome;

/// Pooled HTTP session for one phase of a load test.
#[derive(Debug, Clone)]
pub struct TargetClient {
    http: reqwest::Client,
}

impl TargetClient {
    /// Builds a session whose requests fail with a timeout after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, LoadTestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadTestError::HttpClient {
                message: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Issues a HEAD request and returns the status and advertised length.
    ///
    /// A missing or unparseable `Content-Length` header is reported as 0.
    pub async fn head(&self, url: &str) -> Result<(StatusCode, u64), RequestError> {
        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| RequestError::classify_reqwest(&e))?;

        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Ok((response.status(), content_length))
    }

    /// Issues one GET, reads the whole body and times the exchange.
    ///
    /// Never retries. Transport failures are returned as
    /// [`RequestOutcome::Failed`]; any HTTP status is a completed request.
    pub async fn fetch(&self, url: &str) -> RequestOutcome {
        let start = Instant::now();
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => return RequestOutcome::Failed(RequestError::classify_reqwest(&e)),
        };
        let status = response.status().as_u16();

        match response.bytes().await {
            Ok(body) => RequestOutcome::Completed {
                duration: start.elapsed(),
                status,
                size: body.len() as u64,
            },
            Err(e) => RequestOutcome::Failed(RequestError::classify_reqwest(&e)),
        }
    }
}

/// Returns `true` when `actual` lies within `tolerance` bytes of `expected`.
pub fn size_matches(actual: u64, expected: u64, tolerance: u64) -> bool {
    actual.abs_diff(expected) <= tolerance
}
