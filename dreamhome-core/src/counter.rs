//! Counter allocator - monotonic per-key ids
//!
//! Every id comes from one atomic upsert-and-increment in the backing store,
//! so uniqueness holds across tasks, processes, and restarts. There is no
//! read-then-write path.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::connection::ConnectionManager;
use crate::error::{StoreError, StoreResult};

/// Counter keys used by the DreamHome collections.
pub mod keys {
    pub const CLIENT_ID: &str = "clientId";
    pub const AGENT_ID: &str = "agentId";
    pub const OFFICE_ID: &str = "officeId";
    pub const PROPERTY_ID: &str = "propertyId";
    pub const NOTIFICATION_ID: &str = "notificationId";

    pub const ALL: [&str; 5] = [CLIENT_ID, AGENT_ID, OFFICE_ID, PROPERTY_ID, NOTIFICATION_ID];
}

/// Longest accepted counter key.
///
/// Keys are 1 to 64 ASCII letters, digits, `_` or `-`. They double as field
/// names in the legacy documents, so separators such as `.` are refused.
pub const MAX_KEY_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    /// Value returned by the first allocation for a key
    pub start_value: i64,
    /// Extra attempts after an allocation conflict
    pub max_retries: u32,
    /// Base delay between conflict retries, multiplied by the attempt number
    pub retry_backoff_ms: u64,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            start_value: 1,
            max_retries: 3,
            retry_backoff_ms: 10,
        }
    }
}

impl CounterSettings {
    /// Counter values are non-negative on every backend.
    pub fn validate(&self) -> StoreResult<()> {
        if self.start_value < 0 {
            return Err(StoreError::InvalidSettings(format!(
                "start_value must be non-negative, got {}",
                self.start_value
            )));
        }
        Ok(())
    }
}

/// Hands out the next id for a named counter.
#[derive(Debug, Clone)]
pub struct CounterAllocator {
    manager: ConnectionManager,
    settings: CounterSettings,
}

impl CounterAllocator {
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager,
            settings: CounterSettings::default(),
        }
    }

    /// Fails with `InvalidSettings` when `settings` could issue a negative id.
    pub fn with_settings(
        manager: ConnectionManager,
        settings: CounterSettings,
    ) -> StoreResult<Self> {
        settings.validate()?;
        Ok(Self { manager, settings })
    }

    pub fn settings(&self) -> &CounterSettings {
        &self.settings
    }

    /// Allocate the next value for `key`.
    ///
    /// The first allocation for a key returns `start_value`; each later one
    /// returns the previous value plus one. Conflicts reported by the store
    /// are retried up to `max_retries` times. `NotConnected` is returned
    /// immediately and nothing is written.
    pub async fn next(&self, key: &str) -> StoreResult<i64> {
        validate_key(key)?;

        let start = self.settings.start_value;
        let mut attempt: u32 = 0;
        loop {
            let result = self
                .manager
                .call(|store| async move { store.increment_counter(key, start).await })
                .await;

            match result {
                Ok(value) => {
                    debug!(key, value, "allocated id");
                    return Ok(value);
                }
                Err(StoreError::AllocationConflict { reason, .. })
                    if attempt < self.settings.max_retries =>
                {
                    attempt += 1;
                    warn!(key, attempt, %reason, "allocation conflict, retrying");
                    let backoff = self.settings.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Current value of `key` without changing it. Never creates a record.
    pub async fn peek(&self, key: &str) -> StoreResult<i64> {
        validate_key(key)?;

        self.manager
            .call(|store| async move { store.read_counter(key).await })
            .await?
            .ok_or_else(|| StoreError::NotFound {
                resource: "counter",
                id: key.to_owned(),
            })
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}
