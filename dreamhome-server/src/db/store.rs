//! PostgreSQL implementation of the document store
//!
//! - counters: one row per key in `dh_counters`, advanced by a single
//!   `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`
//! - documents: JSONB rows in `dh_documents`, tagged with their collection

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use dreamhome_core::{Document, DocumentStore, StoreError, StoreResult, COUNTERS_COLLECTION};

/// SQLSTATE codes that mean the server or the socket went away.
const UNAVAILABLE_CODES: &[&str] = &["08000", "08003", "08006", "57P01", "57P02", "57P03"];

/// SQLSTATE codes for a failed atomic increment that is safe to retry:
/// serialization_failure, deadlock_detected, lock_not_available.
const CONFLICT_CODES: &[&str] = &["40001", "40P01", "55P03"];

/// numeric_value_out_of_range: `value + 1` overflowed BIGINT.
const OUT_OF_RANGE: &str = "22003";

pub struct PgStore {
    pool: PgPool,
    endpoint: String,
}

impl PgStore {
    pub fn new(pool: PgPool, endpoint: impl Into<String>) -> Self {
        Self {
            pool,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn increment_counter(&self, key: &str, start: i64) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO dh_counters (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
                SET value = dh_counters.value + 1, updated_at = NOW()
            RETURNING value
            "#,
        )
        .bind(key)
        .bind(start)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_increment(key, e))
    }

    async fn read_counter(&self, key: &str) -> StoreResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT value FROM dh_counters WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        sqlx::query("INSERT INTO dh_documents (collection, body) VALUES ($1, $2)")
            .bind(collection)
            .bind(Json(document))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_scalar::<_, Json<Document>>(
            "SELECT body FROM dh_documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT collection FROM dh_documents
            UNION
            SELECT $1::TEXT WHERE EXISTS (SELECT 1 FROM dh_counters)
            ORDER BY 1
            "#,
        )
        .bind(COUNTERS_COLLECTION)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn drop_all(&self) -> StoreResult<()> {
        // Single statement: both tables are emptied together or not at all
        sqlx::query("TRUNCATE dh_documents, dh_counters RESTART IDENTITY")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map a sqlx error onto the store error kinds.
pub fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::StoreUnavailable(err.to_string()),
        sqlx::Error::Database(db)
            if db
                .code()
                .is_some_and(|code| UNAVAILABLE_CODES.contains(&code.as_ref())) =>
        {
            StoreError::StoreUnavailable(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn classify_increment(key: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(code) if CONFLICT_CODES.contains(&code) => {
                return StoreError::AllocationConflict {
                    key: key.to_owned(),
                    reason: db.message().to_owned(),
                };
            }
            Some(OUT_OF_RANGE) => {
                return StoreError::CounterExhausted {
                    key: key.to_owned(),
                };
            }
            _ => {}
        }
    }
    classify(err)
}
