use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;
use tracing::info;

use super::{check_collection, document_id, DocumentStore, Filter, StoreError};
use crate::config::DatabaseConfig;

/// Postgres-backed store: one table per collection holding a JSONB document.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool once at startup.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Connection("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Connected to document store at {}", redact_url(url));
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn table(collection: &str) -> Result<String, StoreError> {
        check_collection(collection)?;
        Ok(Self::quote_identifier(collection))
    }

    async fn insert_doc(&self, table: &str, doc: Value) -> Result<(), StoreError> {
        let id = document_id(&doc)?;
        let query = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", table);
        sqlx::query(&query)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::DuplicateId(id.to_string())
                }
                _ => StoreError::Sqlx(e),
            })?;
        Ok(())
    }
}

/// Hide the password when logging a connection string.
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ensure_collections(&self, names: &[&str]) -> Result<(), StoreError> {
        for name in names {
            let table = Self::table(name)?;
            let create = format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                    seq BIGSERIAL, \
                    id UUID PRIMARY KEY, \
                    doc JSONB NOT NULL, \
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
                table
            );
            sqlx::query(&create).execute(&self.pool).await?;

            let index = format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN (doc jsonb_path_ops)",
                Self::quote_identifier(&format!("{}_doc_idx", name)),
                table
            );
            sqlx::query(&index).execute(&self.pool).await?;
            info!("Ensured collection: {}", name);
        }
        Ok(())
    }

    async fn insert_one(&self, collection: &str, doc: Value) -> Result<(), StoreError> {
        let table = Self::table(collection)?;
        self.insert_doc(&table, doc).await
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize, StoreError> {
        let table = Self::table(collection)?;
        let total = docs.len();
        for (inserted, doc) in docs.into_iter().enumerate() {
            if let Err(e) = self.insert_doc(&table, doc).await {
                return Err(StoreError::PartialBatch {
                    inserted,
                    total,
                    reason: e.to_string(),
                });
            }
        }
        Ok(total)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let table = Self::table(collection)?;
        let query = format!("SELECT doc FROM {} WHERE doc @> $1 ORDER BY seq", table);
        let rows: Vec<Json<Value>> = sqlx::query_scalar(&query)
            .bind(Json(filter.to_value()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut changes: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let table = Self::table(collection)?;
        changes.remove("id");
        // The filter is re-checked on the locked row so concurrent conditional
        // updates (e.g. booking) cannot both succeed.
        let query = format!(
            "UPDATE {t} SET doc = doc || $2 \
             WHERE id = (SELECT id FROM {t} WHERE doc @> $1 ORDER BY seq LIMIT 1 FOR UPDATE) \
               AND doc @> $1 \
             RETURNING doc",
            t = table
        );
        let row: Option<Json<Value>> = sqlx::query_scalar(&query)
            .bind(Json(filter.to_value()))
            .bind(Json(Value::Object(changes)))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        let table = Self::table(collection)?;
        let query = format!(
            "DELETE FROM {t} \
             WHERE id = (SELECT id FROM {t} WHERE doc @> $1 ORDER BY seq LIMIT 1) \
             RETURNING id",
            t = table
        );
        let deleted: Option<uuid::Uuid> = sqlx::query_scalar(&query)
            .bind(Json(filter.to_value()))
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted.is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
