//! Binary object storage seam for uploaded recordings
mod in_memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use in_memory::InMemoryObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },
    #[error("invalid object key: {key:?}")]
    InvalidKey { key: String },
    /// Raised by remote stores; `InMemoryObjectStore` never returns it
    #[error("object store backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any previous object
    async fn upload(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    async fn download(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
