//! Single-process, file-backed `Store`: one JSON document per section under
//! a configured directory, written via `tempfile` + atomic rename so a
//! crash mid-write never corrupts the section file. Grounded in
//! `sblanchard-SerialAgent`'s `SessionStore` (JSON file under a state dir,
//! `parking_lot::RwLock<HashMap<..>>` in front of it).
use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde_json::Value;

use crate::{StorageInfo, Store, StoreError};

type Section = HashMap<String, Value>;

pub struct FileStore {
    dir: PathBuf,
    sections: Mutex<HashMap<String, Section>>,
}

impl FileStore {
    /// Opens (creating if absent) a file store rooted at `dir`. Any section
    /// file already on disk is loaded eagerly; unknown sections are created
    /// lazily on first write.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::Permanent(format!("create store dir: {e}")))?;
        let mut sections = HashMap::new();
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| StoreError::Permanent(format!("read section {name}: {e}")))?;
                let section: Section = serde_json::from_str(&raw).unwrap_or_default();
                log::info!("[file-store] loaded section {name} ({} docs)", section.len());
                sections.insert(name.to_string(), section);
            }
        }
        Ok(Self {
            dir,
            sections: Mutex::new(sections),
        })
    }

    fn section_path(&self, section: &str) -> PathBuf {
        self.dir.join(format!("{section}.json"))
    }

    /// Atomically persists one section file: write to a temp file in the
    /// same directory, then rename over the target so readers never see a
    /// half-written file.
    fn flush_section(&self, section: &str, data: &Section) -> Result<(), StoreError> {
        let path = self.section_path(section);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| StoreError::Permanent(format!("create temp file: {e}")))?;
        serde_json::to_writer_pretty(&mut tmp, data)
            .map_err(|e| StoreError::Permanent(format!("serialize section {section}: {e}")))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::Permanent(format!("rename into place: {e}")))?;
        Ok(())
    }
}

impl Store for FileStore {
    async fn get(&self, section: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let sections = self.sections.lock();
        Ok(sections.get(section).and_then(|s| s.get(key)).cloned())
    }

    async fn put(&self, section: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        let snapshot = {
            let mut sections = self.sections.lock();
            let entry = sections.entry(section.to_string()).or_default();
            entry.insert(key.to_string(), doc);
            entry.clone()
        };
        self.flush_section(section, &snapshot)
    }

    async fn delete(&self, section: &str, key: &str) -> Result<(), StoreError> {
        let snapshot = {
            let mut sections = self.sections.lock();
            let Some(entry) = sections.get_mut(section) else {
                return Ok(());
            };
            entry.remove(key);
            entry.clone()
        };
        self.flush_section(section, &snapshot)
    }

    async fn list_keys(&self, section: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let sections = self.sections.lock();
        Ok(sections
            .get(section)
            .map(|s| {
                s.keys()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn storage_info(&self) -> Result<StorageInfo, StoreError> {
        let sections = self.sections.lock();
        Ok(StorageInfo {
            backend: "file",
            prefix: self.dir.display().to_string(),
            section_counts: sections.iter().map(|(k, v)| (k.clone(), v.len())).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("profiles", "p1", json!({"name": "Ada"})).await.unwrap();
        let doc = store.get("profiles", "p1").await.unwrap();
        assert_eq!(doc, Some(json!({"name": "Ada"})));
    }

    #[tokio::test]
    async fn reopening_loads_persisted_sections() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.put("profiles", "p1", json!({"name": "Ada"})).await.unwrap();
        }
        let reopened = FileStore::open(dir.path()).unwrap();
        let doc = reopened.get("profiles", "p1").await.unwrap();
        assert_eq!(doc, Some(json!({"name": "Ada"})));
    }

    #[tokio::test]
    async fn delete_removes_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("scores", "s1", json!(1)).await.unwrap();
        store.delete("scores", "s1").await.unwrap();
        assert_eq!(store.get("scores", "s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_keys_filters_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("profiles", "alice", json!({})).await.unwrap();
        store.put("profiles", "amir", json!({})).await.unwrap();
        store.put("profiles", "bob", json!({})).await.unwrap();
        let mut keys = store.list_keys("profiles", "a").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["alice".to_string(), "amir".to_string()]);
    }

    #[tokio::test]
    async fn storage_info_reports_file_backend_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("audit", "1", json!({})).await.unwrap();
        let info = store.storage_info().await.unwrap();
        assert_eq!(info.backend, "file");
        assert_eq!(info.section_counts, vec![("audit".to_string(), 1)]);
    }
}
