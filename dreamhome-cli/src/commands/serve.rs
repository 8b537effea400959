//! HTTP server command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dreamhome_core::DreamhomeConfig;
use dreamhome_server::run_server;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides config/environment)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config/environment)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Directory of static files served for unmatched paths
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: DreamhomeConfig) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.static_dir {
        config.server.static_dir = dir;
    }
    config.server.cors_permissive |= args.cors_permissive;

    tracing::info!(
        "Starting dreamhome server on {}:{}",
        config.server.host,
        config.server.port
    );

    // Run server (blocks until shutdown)
    run_server(config).await.context("Server error")?;

    Ok(())
}
