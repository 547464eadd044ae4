use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use dice_core::Difficulty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submitted match result, durable in the `scores` store section.
/// `id` is deterministic over `(sessionId, playerId)` so resubmitting the
/// same match's result (client retry, reconnect-and-replay) is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: String,
    pub player_id: Uuid,
    pub session_id: Uuid,
    pub difficulty: Difficulty,
    pub total_score: u32,
    pub busts: u32,
    pub rolls_taken: u32,
    pub submitted_at: SystemTime,
}

pub fn compute_entry_id(session_id: Uuid, player_id: Uuid) -> String {
    let mut hasher = DefaultHasher::new();
    session_id.hash(&mut hasher);
    player_id.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    pub session_id: Uuid,
    pub difficulty: Difficulty,
    pub total_score: u32,
    pub busts: u32,
    pub rolls_taken: u32,
}

impl ScoreEntry {
    pub fn from_submission(player_id: Uuid, submission: ScoreSubmission, now: SystemTime) -> Self {
        Self {
            id: compute_entry_id(submission.session_id, player_id),
            player_id,
            session_id: submission.session_id,
            difficulty: submission.difficulty,
            total_score: submission.total_score,
            busts: submission.busts,
            rolls_taken: submission.rolls_taken,
            submitted_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_session_and_player_produce_same_id() {
        let session = Uuid::new_v4();
        let player = Uuid::new_v4();
        assert_eq!(compute_entry_id(session, player), compute_entry_id(session, player));
    }

    #[test]
    fn different_players_produce_different_ids() {
        let session = Uuid::new_v4();
        assert_ne!(
            compute_entry_id(session, Uuid::new_v4()),
            compute_entry_id(session, Uuid::new_v4())
        );
    }
}
