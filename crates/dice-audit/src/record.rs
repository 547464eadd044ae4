use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{at, actorId, actorKind, action, subject, before?, after?, reason?}`.
/// Ids are stored as display strings rather than typed `ID<T>`s — the
/// audit log deliberately forgets entity kinds so it can record mutations
/// against rooms, participants, terms, and roles alike
/// without a growing enum of subject types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub at: SystemTime,
    pub actor_id: String,
    pub actor_kind: String,
    pub action: String,
    pub subject: String,
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub after: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
}
