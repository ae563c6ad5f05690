//! In-memory object store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::store::{CacheStore, StoreError, StoreLimits};

/// A thread-safe map of key -> object. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Bytes>>,
    limits: StoreLimits,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            limits,
        }
    }

    /// Number of cached objects.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Check whether `key` is cached without going through the async trait.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.limits.check_key(key)?;
        Ok(self.inner.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.limits.check_entry(key, &value)?;
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    async fn sync(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::default();
        assert!(store.get("/a.png").await.unwrap().is_none());

        store.put("/a.png", Bytes::from_static(b"png")).await.unwrap();
        assert_eq!(store.get("/a.png").await.unwrap().unwrap(), "png");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_value_not_stored() {
        let store = MemoryStore::new(StoreLimits {
            max_key_size: 200,
            max_value_size: 3,
        });
        let err = store
            .put("/big.jpg", Bytes::from_static(b"too big"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ValueTooLarge { .. }));
        assert!(!store.contains("/big.jpg"));
    }
}
