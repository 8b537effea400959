//! Schema for the document store tables

use sqlx::PgPool;

/// Create the counter and document tables if missing.
///
/// Runs at connect time so the counter table exists before any
/// allocation or seed can reach it.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running document store migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dh_counters (
            key TEXT PRIMARY KEY,
            value BIGINT NOT NULL CHECK (value >= 0),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dh_documents (
            id BIGSERIAL PRIMARY KEY,
            collection TEXT NOT NULL,
            body JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_dh_documents_collection ON dh_documents(collection, id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Document store migrations complete");
    Ok(())
}
