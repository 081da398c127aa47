//! webload: batch-synchronized HTTP load testing for web server comparisons.
//!
//! The [`loadtest`] module holds the engine; [`server`] holds the reference
//! target server used for local runs; [`logging`] installs the tracing
//! subscriber used by the binary.

pub mod loadtest;
pub mod logging;
pub mod server;
