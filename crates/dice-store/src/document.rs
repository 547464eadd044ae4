//! Remote document-store backend over `tokio-postgres`: a single generic
//! `(section, key) -> jsonb` table gives "remote document store"
//! semantics without reaching for an unrelated document-database crate.
use std::sync::Arc;

use serde_json::Value;
use tokio_postgres::Client;

use crate::{StorageInfo, Store, StoreError};

const TABLE: &str = "dice_documents";

pub struct DocumentStore {
    client: Arc<Client>,
}

impl DocumentStore {
    /// Connects using `url` (the `DOCUMENT_STORE_URL` environment
    /// variable) and ensures the backing table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let tls = tokio_postgres::tls::NoTls;
        let (client, connection) = tokio_postgres::connect(url, tls)
            .await
            .map_err(|e| StoreError::Transient(format!("connect: {e}")))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("[document-store] connection closed: {e}");
            }
        });
        let store = Self {
            client: Arc::new(client),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "CREATE TABLE IF NOT EXISTS ",
                    TABLE,
                    " (
                        section TEXT NOT NULL,
                        key     TEXT NOT NULL,
                        body    JSONB NOT NULL,
                        PRIMARY KEY (section, key)
                    );"
                ),
                &[],
            )
            .await
            .map_err(classify)?;
        Ok(())
    }
}

fn classify(err: tokio_postgres::Error) -> StoreError {
    if err.is_closed() {
        StoreError::Transient(err.to_string())
    } else {
        StoreError::Permanent(err.to_string())
    }
}

impl Store for DocumentStore {
    async fn get(&self, section: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let row = self
            .client
            .query_opt(
                const_format::concatcp!("SELECT body FROM ", TABLE, " WHERE section = $1 AND key = $2"),
                &[&section, &key],
            )
            .await
            .map_err(classify)?;
        Ok(row.map(|r| r.get::<_, Value>(0)))
    }

    async fn put(&self, section: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    TABLE,
                    " (section, key, body) VALUES ($1, $2, $3)
                     ON CONFLICT (section, key) DO UPDATE SET body = EXCLUDED.body"
                ),
                &[&section, &key, &doc],
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete(&self, section: &str, key: &str) -> Result<(), StoreError> {
        self.client
            .execute(
                const_format::concatcp!("DELETE FROM ", TABLE, " WHERE section = $1 AND key = $2"),
                &[&section, &key],
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_keys(&self, section: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{prefix}%");
        let rows = self
            .client
            .query(
                const_format::concatcp!(
                    "SELECT key FROM ",
                    TABLE,
                    " WHERE section = $1 AND key LIKE $2"
                ),
                &[&section, &pattern],
            )
            .await
            .map_err(classify)?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    async fn storage_info(&self) -> Result<StorageInfo, StoreError> {
        let rows = self
            .client
            .query(
                const_format::concatcp!(
                    "SELECT section, COUNT(*) FROM ",
                    TABLE,
                    " GROUP BY section"
                ),
                &[],
            )
            .await
            .map_err(classify)?;
        Ok(StorageInfo {
            backend: "document",
            prefix: TABLE.to_string(),
            section_counts: rows
                .iter()
                .map(|r| (r.get::<_, String>(0), r.get::<_, i64>(1) as usize))
                .collect(),
        })
    }
}
