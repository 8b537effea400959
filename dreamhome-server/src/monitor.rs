//! Background connection health monitor
//!
//! Pings the store on an interval while connected (a failed or unanswered
//! ping demotes the connection) and attempts a reconnect whenever the
//! connection is down.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use dreamhome_core::{ConnectionManager, ConnectionState, DatabaseConfig, StoreError};

/// Spawn the monitor loop. Abort the returned handle to stop it.
pub fn spawn(
    manager: ConnectionManager,
    config: DatabaseConfig,
    interval: Duration,
) -> JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "starting store health monitor");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; startup already connected
        ticker.tick().await;
        loop {
            ticker.tick().await;
            check(&manager, &config).await;
        }
    })
}

/// One monitor pass. Returns the state afterwards.
pub async fn check(manager: &ConnectionManager, config: &DatabaseConfig) -> ConnectionState {
    match manager.state() {
        ConnectionState::Connected => {
            if let Err(e) = manager.ping().await {
                warn!(error = %e, "store health check failed");
            }
        }
        ConnectionState::Connecting => {
            debug!("connect attempt already in progress");
        }
        state @ (ConnectionState::Disconnected | ConnectionState::Failed) => {
            info!(%state, "attempting to reconnect to the document store");
            match manager.connect(config.clone()) {
                Ok(ready) => match ready.wait().await {
                    ConnectionState::Connected => info!("reconnected to the document store"),
                    state => warn!(
                        %state,
                        error = manager.last_error().as_deref().unwrap_or("unknown"),
                        "reconnect failed"
                    ),
                },
                Err(StoreError::ConnectInProgress) => {}
                Err(e) => warn!(error = %e, "reconnect could not start"),
            }
        }
    }
    manager.state()
}
