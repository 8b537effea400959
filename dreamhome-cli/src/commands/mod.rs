//! Command implementations for the dreamhome CLI

pub mod counter;
pub mod seed;
pub mod serve;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use dreamhome_core::{ConnectionManager, ConnectionState, DreamhomeConfig};
use dreamhome_server::db::StoreConnector;

pub use counter::run_counter;
pub use seed::{run_reset, run_seed};
pub use serve::run_serve;
pub use status::run_status;

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (default: ~/.dreamhome/config.toml)
    #[arg(long, short = 'c', global = true, env = "DREAMHOME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store URL, e.g. postgres://... or memory:// (overrides config/environment)
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

impl GlobalArgs {
    /// Config file, then environment, then flags.
    pub fn load_config(&self) -> Result<DreamhomeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = DreamhomeConfig::load_from(path)?;
                config.apply_overrides(|name| std::env::var(name).ok());
                config
            }
            None => DreamhomeConfig::load()?,
        };
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        Ok(config)
    }
}

/// Connect to the configured store, failing unless the attempt succeeds.
pub(crate) async fn connect(config: &DreamhomeConfig) -> Result<ConnectionManager> {
    let manager = ConnectionManager::new(Arc::new(StoreConnector::new()));
    match manager.connect_and_wait(config.database.clone()).await? {
        ConnectionState::Connected => Ok(manager),
        state => bail!(
            "could not connect to {} ({}): {}",
            config.database.redacted_url(),
            state,
            manager.last_error().unwrap_or_default()
        ),
    }
}
