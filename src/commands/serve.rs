//! `webload serve` command implementation.

use anyhow::Result;
use clap::Args;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use webload::loadtest::config::DEFAULT_EXPECTED_SIZE;
use webload::server::{serve, Payload, TargetServerConfig};

/// Flags of the `serve` subcommand.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "3000", env = "PORT")]
    pub port: u16,

    /// Size in bytes of the generated payload
    #[arg(long, default_value_t = DEFAULT_EXPECTED_SIZE, conflicts_with = "file")]
    pub size: u64,

    /// Serve this file instead of a generated payload
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Execute the `serve` command until interrupted.
pub async fn execute_serve(args: ServeArgs) -> Result<()> {
    let payload = match args.file {
        Some(path) => Payload::File(path),
        None => Payload::generated(usize::try_from(args.size)?),
    };

    serve(TargetServerConfig {
        addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port)),
        payload,
    })
    .await
}
