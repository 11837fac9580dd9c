//! Object store
//!
//! Key-value storage for published blog documents and per-user index
//! objects. Keys are flat strings such as `<id>.json`; put overwrites,
//! delete is tolerant of missing keys.

pub mod fs;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StorageConfig, StorageDriver};

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

/// Object store trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under a key, overwriting any existing object
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Fetch an object; None if the key does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove an object; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Create an object store based on configuration
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.driver {
        StorageDriver::Fs => Ok(Arc::new(FsObjectStore::new(&config.path)?)),
        StorageDriver::Memory => Ok(Arc::new(MemoryObjectStore::new())),
    }
}
