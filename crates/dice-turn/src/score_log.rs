use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use dice_core::{Count, ID};
use dice_rules::Die;
use dice_sessions::{Participant, Session};

/// A banked scoring batch. `id` is a deterministic hash of
/// `(sessionId, playerId, rollIndex, selectionFingerprint)` so resubmitting
/// the identical selection for the identical roll always produces the same
/// id and is therefore safe to dedup against.
#[derive(Debug, Clone)]
pub struct ScoreLogEntry {
    pub id: u64,
    pub participant_id: ID<Participant>,
    pub roll_index: u32,
    pub dice_selection: Vec<ID<Die>>,
    pub points: Count,
    pub at: SystemTime,
}

pub fn compute_log_id(session_id: ID<Session>, participant_id: ID<Participant>, roll_index: u32, selection: &[ID<Die>]) -> u64 {
    let mut fingerprint: Vec<uuid::Uuid> = selection.iter().map(|id| id.inner()).collect();
    fingerprint.sort();
    let mut hasher = DefaultHasher::new();
    session_id.inner().hash(&mut hasher);
    participant_id.inner().hash(&mut hasher);
    roll_index.hash(&mut hasher);
    fingerprint.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_selection_produces_same_id() {
        let session = ID::default();
        let player = ID::default();
        let a: ID<Die> = ID::default();
        let b: ID<Die> = ID::default();
        let id1 = compute_log_id(session, player, 1, &[a, b]);
        let id2 = compute_log_id(session, player, 1, &[b, a]);
        assert_eq!(id1, id2, "order of the selection shouldn't matter");
    }

    #[test]
    fn different_roll_index_changes_id() {
        let session = ID::default();
        let player = ID::default();
        let a: ID<Die> = ID::default();
        let id1 = compute_log_id(session, player, 1, &[a]);
        let id2 = compute_log_id(session, player, 2, &[a]);
        assert_ne!(id1, id2);
    }
}
