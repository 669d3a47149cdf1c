//! Postgres-backed listing store: one JSONB row per vacancy.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::{StoreError, StoreResult};
use crate::store::ListingStore;
use crate::types::DetailRecord;

/// Name Postgres gives the implicit unique index on `description_hash`.
/// Violations of this constraint mean another key owns the content.
const FINGERPRINT_CONSTRAINT: &str = "vacancies_description_hash_key";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the vacancies table and its uniqueness constraints if missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vacancies (
                id               TEXT PRIMARY KEY,
                data             JSONB NOT NULL,
                description_hash TEXT UNIQUE,
                harvested_at     TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(Box::new(err))
}

#[async_trait]
impl ListingStore for PostgresStore {
    async fn load_known(&self) -> StoreResult<Vec<(String, Option<String>)>> {
        let rows = sqlx::query("SELECT id, description_hash FROM vacancies")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("id"), row.get("description_hash")))
            .collect())
    }

    async fn upsert(&self, record: &DetailRecord) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO vacancies (id, data, description_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
                SET data = EXCLUDED.data,
                    description_hash = EXCLUDED.description_hash
            "#,
        )
        .bind(&record.key.0)
        .bind(&record.payload)
        .bind(&record.fingerprint)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.constraint() == Some(FINGERPRINT_CONSTRAINT) => {
                Err(StoreError::DuplicateFingerprint {
                    fingerprint: record.fingerprint.clone(),
                })
            }
            Err(err) => Err(db_error(err)),
        }
    }
}
