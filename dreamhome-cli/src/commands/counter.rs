//! Counter diagnostics

use anyhow::Result;
use clap::{Parser, Subcommand};

use dreamhome_core::{CounterAllocator, DreamhomeConfig};

use super::connect;

#[derive(Parser, Debug)]
pub struct CounterArgs {
    #[command(subcommand)]
    pub command: CounterCommand,
}

#[derive(Subcommand, Debug)]
pub enum CounterCommand {
    /// Allocate and print the next id for a key
    Next {
        /// Counter key, e.g. clientId
        key: String,
    },
    /// Print the last id issued for a key without advancing it
    Peek {
        /// Counter key, e.g. clientId
        key: String,
    },
}

pub async fn run_counter(args: CounterArgs, config: DreamhomeConfig) -> Result<()> {
    config.counters.validate()?;
    let manager = connect(&config).await?;
    let allocator = CounterAllocator::with_settings(manager.clone(), config.counters.clone())?;

    let value = match &args.command {
        CounterCommand::Next { key } => allocator.next(key).await,
        CounterCommand::Peek { key } => allocator.peek(key).await,
    };
    manager.disconnect().await;

    println!("{}", value?);
    Ok(())
}
