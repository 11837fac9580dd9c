//! In-memory object store
//!
//! Backing store for tests and the `memory` storage driver.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::ObjectStore;

/// Object store backed by a HashMap
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.objects.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryObjectStore::new();

        store.put("a.json", b"{}").await.unwrap();
        assert_eq!(store.get("a.json").await.unwrap(), Some(b"{}".to_vec()));

        assert!(store.delete("a.json").await.unwrap());
        assert!(store.get("a.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryObjectStore::new();

        store.put("a.json", b"one").await.unwrap();
        store.put("a.json", b"two").await.unwrap();

        assert_eq!(store.get("a.json").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_missing_is_false() {
        let store = MemoryObjectStore::new();
        assert!(!store.delete("missing.json").await.unwrap());
    }
}
