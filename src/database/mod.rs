//! Document store: named collections of JSON documents keyed by `id`.
//!
//! Handlers never talk to a backend directly; they go through [`Collection`],
//! which adds typing and the per-operation deadline.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod collection;
pub mod filter;
pub mod memory;
pub mod postgres;

pub use collection::Collection;
pub use filter::Filter;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Every collection the service reads or writes.
pub const COLLECTIONS: [&str; 7] = [
    "users",
    "providers",
    "managers",
    "admins",
    "companies",
    "available_appointments",
    "verifications",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Document has no valid 'id' field")]
    MissingId,

    #[error("Document '{0}' already exists")]
    DuplicateId(String),

    #[error("{operation} on '{collection}' timed out")]
    Timeout {
        collection: String,
        operation: &'static str,
    },

    #[error("Inserted {inserted} of {total} documents: {reason}")]
    PartialBatch {
        inserted: usize,
        total: usize,
        reason: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Single-document operations over named collections. No multi-document
/// transactions are offered.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create backing storage for `names` if it does not exist yet.
    async fn ensure_collections(&self, names: &[&str]) -> Result<(), StoreError>;

    async fn insert_one(&self, collection: &str, doc: Value) -> Result<(), StoreError>;

    /// Inserts in order and stops at the first failure. Documents inserted
    /// before the failure stay; the error is [`StoreError::PartialBatch`].
    async fn insert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize, StoreError>;

    /// All matching documents in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Merge `changes` into the first matching document and return it, or
    /// `None` when nothing matched. Match and write happen atomically.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Remove the first matching document; `false` when nothing matched.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Postgres when a URL is configured, otherwise the in-memory store. Backing
/// tables for every collection are created before returning.
pub async fn open(config: &crate::config::DatabaseConfig) -> Result<std::sync::Arc<dyn DocumentStore>, StoreError> {
    let store: std::sync::Arc<dyn DocumentStore> = match config.url {
        Some(_) => std::sync::Arc::new(PgDocumentStore::connect(config).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            std::sync::Arc::new(MemoryDocumentStore::new())
        }
    };
    store.ensure_collections(&COLLECTIONS).await?;
    Ok(store)
}

/// Collection names map straight onto table names, so only `[a-z_]` is allowed.
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('_')
        && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

pub(crate) fn check_collection(name: &str) -> Result<(), StoreError> {
    if is_valid_collection_name(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

pub(crate) fn document_id(doc: &Value) -> Result<uuid::Uuid, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .and_then(|s| uuid::Uuid::parse_str(s).ok())
        .ok_or(StoreError::MissingId)
}
