//! dreamhome CLI - DreamHome database service
//!
//! Entry point for the `dreamhome` binary:
//! - `serve` runs the HTTP front-end over the document store
//! - `seed` / `reset` populate or wipe the sample collections
//! - `counter` inspects and advances id counters
//! - `status` reports the store connection

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::GlobalArgs;

#[derive(Parser, Debug)]
#[command(
    name = "dreamhome",
    author,
    version,
    about = "DreamHome real-estate database service",
    long_about = "REST front-end and admin tooling for the DreamHome document store. \
                  Ids for clients, agents, offices, properties and notifications are \
                  allocated from atomic per-collection counters."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Populate the sample collections
    Seed,
    /// Drop every collection, counters included
    Reset(commands::seed::ResetArgs),
    /// Inspect or advance an id counter
    Counter(commands::counter::CounterArgs),
    /// Show the store connection state and collections
    Status(commands::status::StatusArgs),
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing().ok();
    let cli = Cli::parse();
    let config = cli.global.load_config()?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::Seed => commands::run_seed(config).await?,
        Commands::Reset(args) => commands::run_reset(args, config).await?,
        Commands::Counter(args) => commands::run_counter(args, config).await?,
        Commands::Status(args) => commands::run_status(args, config).await?,
    }

    Ok(())
}
