//! Store connection status

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use std::sync::Arc;

use dreamhome_core::{ConnectionManager, ConnectionState, DreamhomeConfig};
use dreamhome_server::db::StoreConnector;

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Connect once and report the outcome. A failed connection is reported,
/// not returned as an error.
pub async fn run_status(args: StatusArgs, config: DreamhomeConfig) -> Result<()> {
    let manager = ConnectionManager::new(Arc::new(StoreConnector::new()));
    let state = manager.connect_and_wait(config.database.clone()).await?;

    let collections = if state == ConnectionState::Connected {
        manager.collection_names().await?
    } else {
        Vec::new()
    };
    let error = manager.last_error();
    manager.disconnect().await;

    let endpoint = config.database.redacted_url();
    if args.json {
        let body = json!({
            "state": state,
            "endpoint": endpoint,
            "collections": collections,
            "error": error,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("state:       {}", state);
    println!("endpoint:    {}", endpoint);
    if let Some(error) = error {
        println!("last error:  {}", error);
    }
    if state.is_connected() {
        if collections.is_empty() {
            println!("collections: (none)");
        } else {
            println!("collections: {}", collections.join(", "));
        }
    }
    Ok(())
}
