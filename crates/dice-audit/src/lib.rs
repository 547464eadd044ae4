//! Append-only audit log of admin mutations: a single generic record type
//! written through `dice-store` rather than a dedicated SQL table per
//! entity.
mod error;
mod record;

pub use error::AuditError;
pub use record::AuditRecord;

use std::time::Duration;

use dice_store::Store;

/// Store section every `AuditRecord` is written to.
pub const SECTION: &str = "audit";

/// Appends to and reads back the store's `audit` section. Keys are
/// monotonic nanosecond timestamps so `Audit(paging)` can return
/// newest-first with a stable cursor purely from key ordering.
pub struct AuditLog<S> {
    store: S,
    retention: Duration,
}

impl<S: Store> AuditLog<S> {
    pub fn new(store: S, retention: Duration) -> Self {
        Self { store, retention }
    }

    pub async fn append(&self, record: AuditRecord) -> Result<(), AuditError> {
        let key = audit_key(record.at);
        let doc = serde_json::to_value(&record).map_err(|e| AuditError::Encode(e.to_string()))?;
        self.store.put(SECTION, &key, doc).await.map_err(AuditError::Store)?;
        log::info!(
            "[audit] {} {} on {} by {}",
            record.action,
            record.subject,
            record.actor_kind,
            record.actor_id
        );
        Ok(())
    }

    /// Newest-first page of audit records. `cursor` is the key to resume
    /// before (exclusive); `None` starts from the newest record.
    pub async fn page(&self, cursor: Option<&str>, limit: usize) -> Result<AuditPage, AuditError> {
        let mut keys = self.store.list_keys(SECTION, "").await.map_err(AuditError::Store)?;
        keys.sort();
        keys.reverse();
        let start = match cursor {
            Some(c) => keys.iter().position(|k| k.as_str() < c).unwrap_or(keys.len()),
            None => 0,
        };
        let page_keys: Vec<&String> = keys.iter().skip(start).take(limit.max(1)).collect();
        let mut items = Vec::with_capacity(page_keys.len());
        for key in &page_keys {
            if let Some(doc) = self.store.get(SECTION, key).await.map_err(AuditError::Store)? {
                let record: AuditRecord = serde_json::from_value(doc).map_err(|e| AuditError::Decode(e.to_string()))?;
                items.push(record);
            }
        }
        let next_cursor = page_keys.last().map(|k| (*k).clone());
        Ok(AuditPage { items, next_cursor })
    }

    /// Deletes every record older than the configured retention window.
    /// Run by the orchestrator's ticker set alongside the other
    /// background expiry jobs.
    pub async fn truncate_expired(&self, now: std::time::SystemTime) -> Result<usize, AuditError> {
        let cutoff = now
            .checked_sub(self.retention)
            .unwrap_or(std::time::UNIX_EPOCH);
        let cutoff_key = audit_key(cutoff);
        let keys = self.store.list_keys(SECTION, "").await.map_err(AuditError::Store)?;
        let mut removed = 0;
        for key in keys {
            if key < cutoff_key {
                self.store.delete(SECTION, &key).await.map_err(AuditError::Store)?;
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("[audit] retention pass removed {removed} record(s) older than {:?}", self.retention);
        }
        Ok(removed)
    }
}

pub struct AuditPage {
    pub items: Vec<AuditRecord>,
    pub next_cursor: Option<String>,
}

/// Zero-padded nanosecond timestamp so lexicographic key order matches
/// chronological order.
fn audit_key(at: std::time::SystemTime) -> String {
    let nanos = at
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{nanos:020}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_store::FileStore;
    use std::time::{Duration, SystemTime};

    fn record(at: SystemTime, action: &str) -> AuditRecord {
        AuditRecord {
            at,
            actor_id: "admin-1".into(),
            actor_kind: "operator".into(),
            action: action.into(),
            subject: "room-123".into(),
            before: None,
            after: None,
            reason: None,
        }
    }

    #[tokio::test]
    async fn append_then_page_returns_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let log = AuditLog::new(store, Duration::from_secs(3600));
        let t0 = SystemTime::now();
        log.append(record(t0, "expire_room")).await.unwrap();
        let t1 = t0 + Duration::from_secs(1);
        log.append(record(t1, "remove_participant")).await.unwrap();
        let page = log.page(None, 10).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].action, "remove_participant");
    }

    #[tokio::test]
    async fn truncate_expired_drops_old_records_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let log = AuditLog::new(store, Duration::from_secs(10));
        let old = SystemTime::now() - Duration::from_secs(100);
        log.append(record(old, "expire_room")).await.unwrap();
        let recent = SystemTime::now();
        log.append(record(recent, "assign_role")).await.unwrap();
        let removed = log.truncate_expired(SystemTime::now()).await.unwrap();
        assert_eq!(removed, 1);
        let page = log.page(None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].action, "assign_role");
    }

    #[tokio::test]
    async fn pagination_respects_limit_and_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let log = AuditLog::new(store, Duration::from_secs(3600));
        let base = SystemTime::now();
        for i in 0..5u64 {
            log.append(record(base + Duration::from_secs(i), "tick")).await.unwrap();
        }
        let first_page = log.page(None, 2).await.unwrap();
        assert_eq!(first_page.items.len(), 2);
        let cursor = first_page.next_cursor.clone().unwrap();
        let second_page = log.page(Some(&cursor), 2).await.unwrap();
        assert_eq!(second_page.items.len(), 2);
        assert_ne!(first_page.items[0].at, second_page.items[0].at);
    }
}
