//! Seed and reset commands

use anyhow::{bail, Context, Result};
use clap::Parser;

use dreamhome_core::{CounterAllocator, DreamhomeConfig};
use dreamhome_server::seed::seed_database;

use super::connect;

/// Arguments for the reset command
#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Confirm dropping every collection
    #[arg(long)]
    pub yes: bool,
}

/// Run the seed batch once and print the report as JSON.
pub async fn run_seed(config: DreamhomeConfig) -> Result<()> {
    config.counters.validate()?;
    let manager = connect(&config).await?;
    let allocator = CounterAllocator::with_settings(manager.clone(), config.counters.clone())?;

    let report = seed_database(&manager, &allocator)
        .await
        .context("Seeding failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    manager.disconnect().await;

    if !report.is_complete() {
        bail!("{} seed record(s) failed", report.failures.len());
    }
    Ok(())
}

pub async fn run_reset(args: ResetArgs, config: DreamhomeConfig) -> Result<()> {
    if !args.yes {
        bail!("refusing to drop every collection without --yes");
    }

    let manager = connect(&config).await?;
    manager.drop_all().await.context("Reset failed")?;
    manager.disconnect().await;

    println!("dropped all collections at {}", config.database.redacted_url());
    Ok(())
}
