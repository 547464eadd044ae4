use serde_json::Value;

use crate::{StorageInfo, Store, StoreError};

#[cfg(feature = "file")]
use crate::FileStore;
#[cfg(feature = "document")]
use crate::DocumentStore;

/// Statically dispatches to whichever backend the orchestrator selected at
/// startup (`StoreBackend::from_env`). A single enum rather than `Box<dyn
/// Store>` keeps every call monomorphic and avoids boxing the per-call
/// futures `Store`'s `async fn`s return.
pub enum AnyStore {
    #[cfg(feature = "file")]
    File(FileStore),
    #[cfg(feature = "document")]
    Document(DocumentStore),
}

impl Store for AnyStore {
    async fn get(&self, section: &str, key: &str) -> Result<Option<Value>, StoreError> {
        match self {
            #[cfg(feature = "file")]
            Self::File(s) => s.get(section, key).await,
            #[cfg(feature = "document")]
            Self::Document(s) => s.get(section, key).await,
        }
    }

    async fn put(&self, section: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        match self {
            #[cfg(feature = "file")]
            Self::File(s) => s.put(section, key, doc).await,
            #[cfg(feature = "document")]
            Self::Document(s) => s.put(section, key, doc).await,
        }
    }

    async fn delete(&self, section: &str, key: &str) -> Result<(), StoreError> {
        match self {
            #[cfg(feature = "file")]
            Self::File(s) => s.delete(section, key).await,
            #[cfg(feature = "document")]
            Self::Document(s) => s.delete(section, key).await,
        }
    }

    async fn list_keys(&self, section: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        match self {
            #[cfg(feature = "file")]
            Self::File(s) => s.list_keys(section, prefix).await,
            #[cfg(feature = "document")]
            Self::Document(s) => s.list_keys(section, prefix).await,
        }
    }

    async fn storage_info(&self) -> Result<StorageInfo, StoreError> {
        match self {
            #[cfg(feature = "file")]
            Self::File(s) => s.storage_info().await,
            #[cfg(feature = "document")]
            Self::Document(s) => s.storage_info().await,
        }
    }
}
