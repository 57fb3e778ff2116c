//! Record Repository
//!
//! Appends raw response bodies to the `stuff` table. Rows are never
//! updated or deleted.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Failure to persist a response body
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage write timed out after {0:?}")]
    Timeout(Duration),
}

/// Append-only sink for fetched response bodies
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores one response body fetched by `job_id`
    async fn insert(&self, job_id: Uuid, data: &str) -> Result<(), StoreError>;
}

/// PostgreSQL-backed record store
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, job_id: Uuid, data: &str) -> Result<(), StoreError> {
        insert(&self.pool, job_id, data).await?;
        Ok(())
    }
}

/// Insert a new record
pub async fn insert(pool: &PgPool, job_id: Uuid, data: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO stuff (job_id, data)
        VALUES ($1, $2)
        "#,
    )
    .bind(job_id)
    .bind(data)
    .execute(pool)
    .await?;

    Ok(())
}
