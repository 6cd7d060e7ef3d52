use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{check_collection, document_id, DocumentStore, Filter, StoreError};

/// Process-local store used in development and tests. Collections are
/// created on first write.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_into(docs: &mut Vec<Value>, doc: Value) -> Result<(), StoreError> {
        let id = document_id(&doc)?;
        let id_value = Value::String(id.to_string());
        if docs.iter().any(|d| d.get("id") == Some(&id_value)) {
            return Err(StoreError::DuplicateId(id.to_string()));
        }
        docs.push(doc);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ensure_collections(&self, names: &[&str]) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        for name in names {
            check_collection(name)?;
            collections.entry(name.to_string()).or_default();
        }
        Ok(())
    }

    async fn insert_one(&self, collection: &str, doc: Value) -> Result<(), StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().await;
        Self::insert_into(collections.entry(collection.to_string()).or_default(), doc)
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize, StoreError> {
        check_collection(collection)?;
        let total = docs.len();
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        for (inserted, doc) in docs.into_iter().enumerate() {
            if let Err(e) = Self::insert_into(target, doc) {
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
        check_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(None);
        };

        if let Value::Object(fields) = doc {
            for (key, value) in changes {
                // The id is the storage key and never changes.
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
