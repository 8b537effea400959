//! Axum server setup
//!
//! Startup order:
//! 1. begin connecting to the document store
//! 2. wait for the attempt to conclude (bounded by the connect timeout)
//! 3. bind and serve, whether or not the store came up
//!
//! Requests that need the store get 503 until it is connected.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use dreamhome_core::{
    ConnectionManager, ConnectionState, CounterAllocator, DatabaseConfig, DreamhomeConfig,
    ServerSettings,
};

use super::routes;
use crate::db::StoreConnector;
use crate::error::{ServerError, ServerResult};
use crate::monitor;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    pub request_timeout: Duration,

    /// Directory served for paths no route claims
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_permissive: false,
            request_timeout: Duration::from_secs(30),
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings) -> ServerResult<Self> {
        let addr = format!("{}:{}", settings.host, settings.port);
        let bind_addr = addr
            .parse()
            .map_err(|_| ServerError::BindAddress(addr.clone()))?;

        Ok(Self {
            bind_addr,
            cors_permissive: settings.cors_permissive,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            static_dir: settings.static_dir.clone(),
        })
    }
}

/// Shared application state
pub struct AppState {
    pub manager: ConnectionManager,
    pub allocator: CounterAllocator,
    /// Connection settings, kept for diagnostics
    pub database: DatabaseConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        manager: ConnectionManager,
        allocator: CounterAllocator,
        database: DatabaseConfig,
    ) -> Self {
        Self {
            manager,
            allocator,
            database,
            started_at: Instant::now(),
        }
    }
}

/// Build the router with every route, middleware, and the static fallback.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        let port = config.bind_addr.port();
        let origins: Vec<HeaderValue> = [
            format!("http://localhost:{}", port),
            format!("http://127.0.0.1:{}", port),
        ]
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::admin::router())
        .merge(routes::collections::router())
        .merge(routes::counters::router())
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server.
///
/// Connects to the configured store first and waits for the attempt to
/// settle, then serves until Ctrl+C or SIGTERM. A failed connection is
/// logged, not fatal.
///
/// # Example
///
/// ```ignore
/// let config = DreamhomeConfig::load()?;
/// run_server(config).await?;
/// ```
pub async fn run_server(config: DreamhomeConfig) -> ServerResult<()> {
    let server_config = ServerConfig::from_settings(&config.server)?;

    let manager = ConnectionManager::new(Arc::new(StoreConnector::new()));
    let allocator = CounterAllocator::with_settings(manager.clone(), config.counters.clone())?;

    tracing::info!("DreamHome database service starting");
    let ready = manager.connect(config.database.clone())?;
    match ready.wait().await {
        ConnectionState::Connected => {
            tracing::info!(
                endpoint = %config.database.redacted_url(),
                "application has connected to the document store"
            );
        }
        state => {
            tracing::warn!(
                %state,
                error = manager.last_error().as_deref().unwrap_or("unknown"),
                "application failed to connect to the document store; serving anyway"
            );
        }
    }

    let health = config
        .database
        .health_check_interval()
        .map(|interval| monitor::spawn(manager.clone(), config.database.clone(), interval));

    let state = Arc::new(AppState::new(
        manager.clone(),
        allocator,
        config.database.clone(),
    ));
    let app = build_router(state, &server_config);

    let listener = TcpListener::bind(server_config.bind_addr).await?;
    tracing::info!("Server listening on {}", server_config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = health {
        handle.abort();
    }
    manager.disconnect().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
