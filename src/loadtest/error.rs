//! Error types for the load testing engine.
//!
//! Defines [`LoadTestError`] for failures that abort a run (configuration,
//! preflight transport failures, report I/O) and [`RequestError`] for
//! per-request failures that are recorded and counted instead of propagated.

/// Errors that abort a load test run or one of its setup phases.
#[derive(Debug, thiserror::Error)]
pub enum LoadTestError {
    /// TOML parse failure -- the config file contains invalid TOML syntax
    /// or does not match the expected schema.
    #[error("Failed to parse config TOML: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// Semantic validation failure -- the config parsed successfully but
    /// contains invalid values (e.g., no servers, zero batch size).
    #[error("Config validation error: {message}")]
    ConfigValidation { message: String },

    /// File I/O failure -- the config file could not be read from disk.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        source: std::io::Error,
        path: String,
    },

    /// The HTTP session could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },

    /// Transport failure while probing a server before the timed run.
    #[error("Preflight probe of '{server}' failed: {source}")]
    Preflight {
        server: String,
        source: RequestError,
    },

    /// The statistics report could not be written.
    #[error("Failed to write report '{path}': {source}")]
    ReportIo {
        source: std::io::Error,
        path: String,
    },
}

/// Per-request failures recorded by the dispatch loop.
///
/// Each variant maps to one error tag in the per-server tally. Non-200
/// statuses are not errors here; they are completed requests.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request exceeded the configured per-request timeout.
    #[error("timeout")]
    Timeout,

    /// Client or transport failure (connect, send, body read, redirect, decode).
    #[error("{message}")]
    Client { message: String },

    /// Anything the client reports that is not a transport failure
    /// (e.g., a malformed request that could not be built).
    #[error("{message}")]
    Other { message: String },
}

impl RequestError {
    /// Returns the tally tag for this error.
    ///
    /// Tags: `"timeout"`, `"client_error"`, `"other_error"`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Client { .. } => "client_error",
            Self::Other { .. } => "other_error",
        }
    }

    /// Classify a [`reqwest::Error`] into the appropriate [`RequestError`] variant.
    pub fn classify_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect()
            || err.is_request()
            || err.is_body()
            || err.is_decode()
            || err.is_redirect()
        {
            Self::Client {
                message: err.to_string(),
            }
        } else {
            Self::Other {
                message: err.to_string(),
            }
        }
    }
}
