//! webload: compare web servers by response time under batched load.

use anyhow::Result;
use clap::{Parser, Subcommand};

use webload::logging::{init_tracing, LogFormat};

mod commands;

/// Batch-synchronized HTTP load tester
#[derive(Parser)]
#[command(name = "webload")]
#[command(about = "Compare web servers under concurrent load", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load test against the configured servers
    ///
    /// Reads webload.toml (or the file given with --config, or the built-in
    /// targets), sends requests in batches, prints per-server statistics and
    /// writes a JSON report.
    Run(commands::run::RunArgs),

    /// Generate a starter webload.toml in the current directory
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Serve a benchmark payload at /test-file
    ///
    /// A reference target for local runs; also answers /health.
    Serve(commands::serve::ServeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);
    execute_command(cli.command)
}

fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(commands::run::execute_run(args))?;
        },
        Commands::Init { force } => {
            commands::init::execute_init(force)?;
        },
        Commands::Serve(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::serve::execute_serve(args))?;
        },
    }

    Ok(())
}
