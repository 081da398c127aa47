//! `webload` CLI subcommands.
//!
//! Provides `run` (execute a load test), `init` (generate starter config)
//! and `serve` (run the reference target server).

pub mod init;
pub mod run;
pub mod serve;

/// Config file name looked up by `run` and written by `init`.
pub const CONFIG_FILE_NAME: &str = "webload.toml";
