//! `webload run` command implementation.

use anyhow::Result;
use clap::Args;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use webload::loadtest::config::LoadTestConfig;
use webload::loadtest::display::TerminalProgress;
use webload::loadtest::engine::LoadTestEngine;
use webload::loadtest::report::write_report;
use webload::loadtest::summary::render_summary;

use super::CONFIG_FILE_NAME;

/// Flags of the `run` subcommand.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Path to config file (default: auto-discover webload.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Requests per server (overrides config)
    #[arg(long, short = 'n')]
    pub requests: Option<u32>,

    /// Requests per server per batch (overrides config)
    #[arg(long, short = 'c')]
    pub concurrency: Option<u32>,

    /// Per-request timeout in milliseconds (overrides config)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Directory for the JSON report (default: current directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Skip the HEAD payload size verification
    #[arg(long)]
    pub skip_preflight: bool,

    /// Disable JSON report output
    #[arg(long)]
    pub no_report: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Execute the `run` command.
///
/// Loads config (explicit path, discovered file, or built-in defaults),
/// applies CLI overrides, runs the engine and prints the summary.
pub async fn execute_run(args: RunArgs) -> Result<()> {
    // Step 1: Load config
    let mut config = match resolve_config_path(args.config.as_deref())? {
        Some(path) => {
            eprintln!("Loading config from: {}", path.display());
            LoadTestConfig::load(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config '{}': {}", path.display(), e)
            })?
        },
        None => {
            tracing::info!("no {CONFIG_FILE_NAME} found, using built-in targets");
            LoadTestConfig::default()
        },
    };

    // Step 2: Apply CLI overrides
    apply_overrides(&mut config, &args);

    // Step 3: Run the engine
    let engine = LoadTestEngine::new(config).with_skip_preflight(args.skip_preflight);
    let mut progress = TerminalProgress::new(engine.config().settings.num_requests);
    let result = engine
        .run(&mut progress)
        .await
        .map_err(|e| anyhow::anyhow!("Load test failed: {}", e))?;

    // Step 4: Terminal summary
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let stats = result.statistics();
    println!("{}", render_summary(&stats));

    // Step 5: JSON report (unless --no-report)
    if !args.no_report {
        let dir = match args.output_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        match write_report(&stats, &dir) {
            Ok(path) => {
                eprintln!();
                eprintln!("Report written to: {}", path.display());
            },
            Err(e) => {
                eprintln!();
                eprintln!("Warning: Failed to write report: {}", e);
            },
        }
    }

    Ok(())
}

/// Apply CLI flag overrides to a loaded config.
fn apply_overrides(config: &mut LoadTestConfig, args: &RunArgs) {
    if let Some(n) = args.requests {
        config.settings.num_requests = n;
    }
    if let Some(c) = args.concurrency {
        config.settings.concurrent_requests = c;
    }
    if let Some(t) = args.timeout_ms {
        config.settings.timeout_ms = t;
    }
}

/// Picks the config file to load, if any.
///
/// An explicit path must exist. Otherwise `webload.toml` is searched from the
/// current directory upwards; `None` means the built-in defaults apply.
fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: {}\nUse `webload init` to create one.",
                    path.display()
                );
            }
            Ok(Some(path.to_path_buf()))
        },
        None => Ok(discover_config(&std::env::current_dir()?)),
    }
}

/// Discover `webload.toml` by walking parent directories from `start`.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_requests_and_concurrency() {
        let mut config = LoadTestConfig::default();
        let args = RunArgs {
            requests: Some(25),
            concurrency: Some(5),
            ..RunArgs::default()
        };

        apply_overrides(&mut config, &args);
        assert_eq!(config.settings.num_requests, 25);
        assert_eq!(config.settings.concurrent_requests, 5);
        assert_eq!(config.settings.timeout_ms, 300_000);
    }

    #[test]
    fn test_apply_overrides_timeout() {
        let mut config = LoadTestConfig::default();
        let args = RunArgs {
            timeout_ms: Some(1500),
            ..RunArgs::default()
        };

        apply_overrides(&mut config, &args);
        assert_eq!(config.settings.timeout_ms, 1500);
        assert_eq!(config.settings.num_requests, 100);
        assert_eq!(config.settings.concurrent_requests, 10);
    }

    #[test]
    fn test_apply_overrides_none() {
        let mut config = LoadTestConfig::default();
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config, LoadTestConfig::default());
    }

    #[test]
    fn test_discover_config_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();

        let found = discover_config(&nested).unwrap();
        assert_eq!(found, tmp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_resolve_config_path_rejects_missing_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");
        let err = resolve_config_path(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
