//! Preflight payload-size verification.
//!
//! Before the timed run, every target is probed with a HEAD request to make
//! sure it advertises a payload of the expected size. A mismatch is only a
//! warning. A transport failure aborts the run with
//! [`LoadTestError::Preflight`].

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::loadtest::client::{size_matches, TargetClient};
use crate::loadtest::config::{LoadTestConfig, ServerTarget};
use crate::loadtest::error::{LoadTestError, RequestError};

/// Result of probing one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightCheck {
    /// Server name.
    pub server: String,
    /// Whether the server advertised the expected payload size.
    pub verified: bool,
}

/// Probes `url` and reports whether it serves `expected` bytes (± `tolerance`).
///
/// Returns `Ok(true)` only for a 200 response whose `Content-Length` lies
/// within tolerance. No body is transferred.
pub async fn verify_payload_size(
    client: &TargetClient,
    url: &str,
    expected: u64,
    tolerance: u64,
) -> Result<bool, RequestError> {
    let (status, content_length) = client.head(url).await?;
    debug!(%url, %status, content_length, "preflight probe");
    Ok(status == StatusCode::OK && size_matches(content_length, expected, tolerance))
}

/// Probes every configured server in order with a dedicated session.
///
/// Prints a warning line for each server that fails verification and keeps
/// going. The first transport failure stops the probe and is returned.
pub async fn run_preflight(
    config: &LoadTestConfig,
) -> Result<Vec<PreflightCheck>, LoadTestError> {
    let client = TargetClient::new(config.settings.timeout_as_duration())?;
    let mut checks = Vec::with_capacity(config.server.len());

    for ServerTarget { name, url } in &config.server {
        let verified = verify_payload_size(
            &client,
            url,
            config.settings.expected_size_bytes,
            config.settings.size_tolerance_bytes,
        )
        .await
        .map_err(|source| LoadTestError::Preflight {
            server: name.clone(),
            source,
        })?;

        if !verified {
            warn!(server = %name, %url, "payload size verification failed");
            println!("WARNING: {name} may not be serving the correct file size!");
        }

        checks.push(PreflightCheck {
            server: name.clone(),
            verified,
        });
    }

    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_preflight_propagates_transport_failure() {
        let config = LoadTestConfig::with_servers(vec![ServerTarget::new(
            "down",
            "http://127.0.0.1:1/test-file",
        )]);
        let err = run_preflight(&config).await.unwrap_err();
        match err {
            LoadTestError::Preflight { server, source } => {
                assert_eq!(server, "down");
                assert_eq!(source.tag(), "client_error");
            },
            other => panic!("expected preflight error, got {other:?}"),
        }
    }
}
