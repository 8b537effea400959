//! Backend selection by URL scheme
//!
//! `memory://` URLs get the in-process store; everything else is treated as
//! a PostgreSQL connection string.

use std::sync::Arc;

use async_trait::async_trait;

use dreamhome_core::{
    Connector, DatabaseConfig, DocumentStore, MemoryConnector, StoreError, StoreResult,
};

use super::{create_pool_with_options, migrations, PgStore};

#[derive(Default)]
pub struct StoreConnector {
    memory: MemoryConnector,
}

impl StoreConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-process backend used for `memory://` URLs.
    pub fn memory(&self) -> &MemoryConnector {
        &self.memory
    }
}

#[async_trait]
impl Connector for StoreConnector {
    async fn connect(&self, config: &DatabaseConfig) -> StoreResult<Arc<dyn DocumentStore>> {
        if config.is_memory() {
            tracing::warn!("using in-memory document store; data is lost on exit");
            return self.memory.connect(config).await;
        }

        let endpoint = config.redacted_url();
        let failed = |e: sqlx::Error| StoreError::ConnectFailed {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        };

        let pool = create_pool_with_options(
            &config.url,
            config.max_connections,
            config.connect_timeout(),
        )
        .await
        .map_err(failed)?;
        migrations::run(&pool).await.map_err(failed)?;

        Ok(Arc::new(PgStore::new(pool, endpoint.clone())))
    }
}
