use serde_json::Value;

use crate::StoreError;

/// Section-keyed document store. A "section" groups related documents
/// (`profiles`, `scores`, `audit`, `rooms`, moderation ledgers); a "key"
/// identifies one document within it. Implementations need not support
/// cross-section transactions.
#[allow(async_fn_in_trait)]
pub trait Store: Send + Sync {
    async fn get(&self, section: &str, key: &str) -> Result<Option<Value>, StoreError>;
    async fn put(&self, section: &str, key: &str, doc: Value) -> Result<(), StoreError>;
    async fn delete(&self, section: &str, key: &str) -> Result<(), StoreError>;
    async fn list_keys(&self, section: &str, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Invokes `f` with every `(key, doc)` pair in `section` whose key
    /// starts with `prefix`. Default implementation is a `list_keys` +
    /// per-key `get`; backends with a native cursor can override this.
    async fn scan<F>(&self, section: &str, prefix: &str, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(&str, &Value) + Send,
    {
        for key in self.list_keys(section, prefix).await? {
            if let Some(doc) = self.get(section, &key).await? {
                f(&key, &doc);
            }
        }
        Ok(())
    }

    /// Active backend kind and per-section document counts, used by the
    /// admin `StorageInfo` read.
    async fn storage_info(&self) -> Result<StorageInfo, StoreError>;
}

impl<T: Store> Store for std::sync::Arc<T> {
    async fn get(&self, section: &str, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(section, key).await
    }

    async fn put(&self, section: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        (**self).put(section, key, doc).await
    }

    async fn delete(&self, section: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(section, key).await
    }

    async fn list_keys(&self, section: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_keys(section, prefix).await
    }

    async fn storage_info(&self) -> Result<StorageInfo, StoreError> {
        (**self).storage_info().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageInfo {
    pub backend: &'static str,
    pub prefix: String,
    pub section_counts: Vec<(String, usize)>,
}
