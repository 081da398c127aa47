//! Load testing engine for comparing web servers.
//!
//! Provides typed TOML configuration, preflight payload verification,
//! batch-synchronized request dispatch, per-server result logs and the
//! statistics, terminal and JSON reporting built on top of them.

pub mod client;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod preflight;
pub mod report;
pub mod stats;
pub mod summary;
