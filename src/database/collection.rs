use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::{DocumentStore, Filter, StoreError};

/// Typed view of one collection. Every call is bounded by `timeout`; an
/// operation that overruns is abandoned and reported as
/// [`StoreError::Timeout`], never retried.
pub struct Collection<T> {
    name: &'static str,
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            store: self.store.clone(),
            timeout: self.timeout,
            _phantom: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(name: &'static str, store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self {
            name,
            store,
            timeout,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    async fn bounded<R, F>(&self, operation: &'static str, fut: F) -> Result<R, StoreError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("{} on '{}' exceeded {:?}", operation, self.name, self.timeout);
                Err(StoreError::Timeout {
                    collection: self.name.to_string(),
                    operation,
                })
            }
        }
    }

    fn decode(doc: Value) -> Result<T, StoreError> {
        Ok(serde_json::from_value(doc)?)
    }

    pub async fn insert(&self, record: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(record)?;
        self.bounded("insert_one", self.store.insert_one(self.name, doc)).await
    }

    pub async fn insert_many(&self, records: &[T]) -> Result<usize, StoreError> {
        let docs = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.bounded("insert_many", self.store.insert_many(self.name, docs)).await
    }

    pub async fn find(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        let docs = self.bounded("find", self.store.find(self.name, &filter)).await?;
        docs.into_iter().map(Self::decode).collect()
    }

    pub async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Like `find_one`, but a miss is [`StoreError::NotFound`] naming `what`.
    pub async fn find_404(&self, filter: Filter, what: &str) -> Result<T, StoreError> {
        self.find_one(filter)
            .await?
            .ok_or_else(|| StoreError::NotFound(what.to_string()))
    }

    pub async fn update(&self, filter: Filter, changes: Map<String, Value>) -> Result<Option<T>, StoreError> {
        let updated = self
            .bounded("update_one", self.store.update_one(self.name, &filter, changes))
            .await?;
        updated.map(Self::decode).transpose()
    }

    pub async fn update_404(&self, filter: Filter, changes: Map<String, Value>, what: &str) -> Result<T, StoreError> {
        self.update(filter, changes)
            .await?
            .ok_or_else(|| StoreError::NotFound(what.to_string()))
    }

    pub async fn delete(&self, filter: Filter) -> Result<bool, StoreError> {
        self.bounded("delete_one", self.store.delete_one(self.name, &filter)).await
    }
}
