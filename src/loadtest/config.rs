//! TOML-based load test configuration.
//!
//! Defines the ordered list of target servers and the run parameters.
//! Every field has a default, so an empty file (or no file at all) yields
//! the built-in four-server comparison setup.
//!
//! # Example TOML
//!
//! ```toml
//! [settings]
//! num_requests = 100
//! concurrent_requests = 10
//! timeout_ms = 300000
//! expected_size_bytes = 10485760
//! size_tolerance_bytes = 1024
//!
//! [[server]]
//! name = "nginx"
//! url = "http://localhost:8081/test-file"
//!
//! [[server]]
//! name = "caddy"
//! url = "http://localhost:8083/test-file"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::loadtest::error::LoadTestError;

/// Size of the payload every target is expected to serve: 10 MiB.
pub const DEFAULT_EXPECTED_SIZE: u64 = 10 * 1024 * 1024;

/// Allowed deviation from the expected payload size: 1 KiB.
pub const DEFAULT_SIZE_TOLERANCE: u64 = 1024;

/// A named server under test.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    /// Logical name used as the key in every report.
    pub name: String,
    /// URL fetched by every request.
    pub url: String,
}

impl ServerTarget {
    /// Creates a target from a name and URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Top-level load test configuration parsed from a TOML file.
///
/// The field name is `server` (not `servers`) because TOML `[[server]]`
/// array-of-tables syntax creates a key called `server`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoadTestConfig {
    /// Run parameters.
    #[serde(default)]
    pub settings: Settings,
    /// Servers in report order.
    #[serde(default = "default_servers")]
    pub server: Vec<ServerTarget>,
}

/// Run parameters controlling batch dispatch and payload verification.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Total requests sent to each server.
    #[serde(default = "default_num_requests")]
    pub num_requests: u32,
    /// Requests sent to each server per batch.
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Payload size every server is expected to return.
    #[serde(default = "default_expected_size")]
    pub expected_size_bytes: u64,
    /// Allowed absolute deviation from `expected_size_bytes`.
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance_bytes: u64,
}

fn default_num_requests() -> u32 {
    100
}

fn default_concurrent_requests() -> u32 {
    10
}

/// Five minutes, the total-request budget of a stock HTTP session.
fn default_timeout_ms() -> u64 {
    300_000
}

fn default_expected_size() -> u64 {
    DEFAULT_EXPECTED_SIZE
}

fn default_size_tolerance() -> u64 {
    DEFAULT_SIZE_TOLERANCE
}

/// The four servers compared out of the box, on localhost ports 8081-8084.
pub fn default_servers() -> Vec<ServerTarget> {
    vec![
        ServerTarget::new("nginx", "http://localhost:8081/test-file"),
        ServerTarget::new("apache", "http://localhost:8082/test-file"),
        ServerTarget::new("caddy", "http://localhost:8083/test-file"),
        ServerTarget::new("express", "http://localhost:8084/test-file"),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_requests: default_num_requests(),
            concurrent_requests: default_concurrent_requests(),
            timeout_ms: default_timeout_ms(),
            expected_size_bytes: default_expected_size(),
            size_tolerance_bytes: default_size_tolerance(),
        }
    }
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            server: default_servers(),
        }
    }
}

impl LoadTestConfig {
    /// Builds a config for the given servers with default settings.
    pub fn with_servers(server: Vec<ServerTarget>) -> Self {
        Self {
            settings: Settings::default(),
            server,
        }
    }

    /// Parse a TOML string into a validated [`LoadTestConfig`].
    pub fn from_toml(content: &str) -> Result<Self, LoadTestError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a [`LoadTestConfig`] from a file path.
    ///
    /// Returns [`LoadTestError::ConfigIo`] if the file cannot be read,
    /// [`LoadTestError::ConfigParse`] if the TOML is malformed, or
    /// [`LoadTestError::ConfigValidation`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, LoadTestError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadTestError::ConfigIo {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Serializes the config back to TOML (used by `webload init`).
    pub fn to_toml(&self) -> Result<String, LoadTestError> {
        toml::to_string_pretty(self).map_err(|e| LoadTestError::ConfigValidation {
            message: format!("config is not representable as TOML: {e}"),
        })
    }

    /// Validate that the config is semantically correct.
    ///
    /// Checks:
    /// - At least one server is configured
    /// - Server names are non-empty and unique
    /// - Every URL parses and uses `http` or `https`
    /// - Request count, batch size and timeout are positive
    pub fn validate(&self) -> Result<(), LoadTestError> {
        if self.server.is_empty() {
            return Err(validation("Config must contain at least one [[server]] entry"));
        }

        let mut seen = HashSet::new();
        for target in &self.server {
            if target.name.trim().is_empty() {
                return Err(validation("Server names must not be empty"));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(validation(format!(
                    "Duplicate server name '{}'",
                    target.name
                )));
            }
            let parsed = url::Url::parse(&target.url).map_err(|e| {
                validation(format!(
                    "Server '{}' has an invalid url '{}': {e}",
                    target.name, target.url
                ))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(validation(format!(
                    "Server '{}' must use http or https, got '{}'",
                    target.name,
                    parsed.scheme()
                )));
            }
        }

        if self.settings.num_requests == 0 {
            return Err(validation("settings.num_requests must be greater than 0"));
        }
        if self.settings.concurrent_requests == 0 {
            return Err(validation(
                "settings.concurrent_requests must be greater than 0",
            ));
        }
        if self.settings.timeout_ms == 0 {
            return Err(validation("settings.timeout_ms must be greater than 0"));
        }

        Ok(())
    }
}

fn validation(message: impl Into<String>) -> LoadTestError {
    LoadTestError::ConfigValidation {
        message: message.into(),
    }
}

impl Settings {
    /// Convert the `timeout_ms` field to a [`Duration`].
    pub fn timeout_as_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = LoadTestConfig::from_toml("").unwrap();
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.server, default_servers());
    }

    #[test]
    fn test_default_servers_are_ordered_on_ports_8081_to_8084() {
        let names: Vec<_> = default_servers().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["nginx", "apache", "caddy", "express"]);
        for (i, target) in default_servers().iter().enumerate() {
            assert!(
                target.url.contains(&format!(":{}/", 8081 + i)),
                "unexpected url {}",
                target.url
            );
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.num_requests, 100);
        assert_eq!(settings.concurrent_requests, 10);
        assert_eq!(settings.expected_size_bytes, 10_485_760);
        assert_eq!(settings.size_tolerance_bytes, 1024);
    }

    #[test]
    fn test_parse_custom_servers_replaces_defaults() {
        let toml_str = r#"
[settings]
num_requests = 25
concurrent_requests = 10

[[server]]
name = "local"
url = "http://127.0.0.1:9000/test-file"
"#;
        let config = LoadTestConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.settings.num_requests, 25);
        assert_eq!(config.settings.timeout_ms, 300_000);
        assert_eq!(
            config.server,
            vec![ServerTarget::new("local", "http://127.0.0.1:9000/test-file")]
        );
    }

    #[test]
    fn test_validate_empty_servers_fails() {
        let config = LoadTestConfig::with_servers(vec![]);
        assert!(matches!(
            config.validate().unwrap_err(),
            LoadTestError::ConfigValidation { .. }
        ));
    }

    #[test]
    fn test_validate_duplicate_names_fails() {
        let config = LoadTestConfig::with_servers(vec![
            ServerTarget::new("a", "http://localhost:1/x"),
            ServerTarget::new("a", "http://localhost:2/x"),
        ]);
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("Duplicate"), "got: {msg}");
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let config = LoadTestConfig::with_servers(vec![ServerTarget::new("a", "not a url")]);
        assert!(config.validate().is_err());

        let config = LoadTestConfig::with_servers(vec![ServerTarget::new("a", "ftp://host/file")]);
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("http or https"), "got: {msg}");
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = LoadTestConfig::default();
        config.settings.concurrent_requests = 0;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("concurrent_requests"), "got: {msg}");
    }

    #[test]
    fn test_validate_zero_requests_fails() {
        let mut config = LoadTestConfig::default();
        config.settings.num_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_toml_parses_back() {
        let config = LoadTestConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = LoadTestConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.server, config.server);
        assert_eq!(parsed.settings, config.settings);
    }

    #[test]
    fn test_load_from_file() {
        let toml_content = r#"
[settings]
concurrent_requests = 4

[[server]]
name = "one"
url = "http://localhost:8081/test-file"
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        tmpfile.write_all(toml_content.as_bytes()).unwrap();
        tmpfile.flush().unwrap();

        let config = LoadTestConfig::load(tmpfile.path()).unwrap();
        assert_eq!(config.settings.concurrent_requests, 4);
        assert_eq!(config.server.len(), 1);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = LoadTestConfig::load(Path::new("/nonexistent/webload.toml"));
        assert!(matches!(
            result.unwrap_err(),
            LoadTestError::ConfigIo { .. }
        ));
    }

    #[test]
    fn test_timeout_as_duration() {
        let settings = Settings {
            timeout_ms: 250,
            ..Settings::default()
        };
        assert_eq!(settings.timeout_as_duration(), Duration::from_millis(250));
    }
}
