use std::collections::HashSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Anonymous,
    Federated,
}

/// A player's durable profile. `settings`/`progression` are left as opaque
/// JSON so client-owned shape changes don't require a server migration —
/// the server only enforces the identity/block-list invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: Uuid,
    pub display_name: String,
    pub identity_kind: IdentityKind,
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default)]
    pub progression: serde_json::Value,
    #[serde(default)]
    pub blocked_player_ids: HashSet<Uuid>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl PlayerProfile {
    pub fn new_anonymous(player_id: Uuid, display_name: String) -> Self {
        let now = SystemTime::now();
        Self {
            player_id,
            display_name,
            identity_kind: IdentityKind::Anonymous,
            settings: serde_json::Value::Null,
            progression: serde_json::Value::Null,
            blocked_player_ids: HashSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Anonymous identities may upgrade once to federated, keeping the
    /// same `playerId`.
    pub fn upgrade_to_federated(&mut self) {
        self.identity_kind = IdentityKind::Federated;
        self.updated_at = SystemTime::now();
    }

    pub fn is_federated(&self) -> bool {
        matches!(self.identity_kind, IdentityKind::Federated)
    }

    pub fn block(&mut self, other: Uuid) {
        self.blocked_player_ids.insert(other);
        self.updated_at = SystemTime::now();
    }

    pub fn unblock(&mut self, other: Uuid) {
        self.blocked_player_ids.remove(&other);
        self.updated_at = SystemTime::now();
    }

    pub fn has_blocked(&self, other: Uuid) -> bool {
        self.blocked_player_ids.contains(&other)
    }

    /// Applies a patch to the mutable fields. Settings writes are rejected
    /// by the caller for non-federated identities before this is invoked —
    /// federated identities only may write settings.
    pub fn apply_patch(&mut self, display_name: Option<String>, settings: Option<serde_json::Value>) {
        if let Some(name) = display_name {
            self.display_name = name;
        }
        if let Some(settings) = settings {
            self.settings = settings;
        }
        self.updated_at = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_keeps_player_id_and_flips_kind() {
        let id = Uuid::new_v4();
        let mut profile = PlayerProfile::new_anonymous(id, "Lurker".into());
        profile.upgrade_to_federated();
        assert_eq!(profile.player_id, id);
        assert!(profile.is_federated());
    }

    #[test]
    fn blocking_is_reversible() {
        let mut profile = PlayerProfile::new_anonymous(Uuid::new_v4(), "A".into());
        let other = Uuid::new_v4();
        profile.block(other);
        assert!(profile.has_blocked(other));
        profile.unblock(other);
        assert!(!profile.has_blocked(other));
    }
}
