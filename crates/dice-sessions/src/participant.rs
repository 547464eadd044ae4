use std::time::SystemTime;

use dice_core::{Difficulty, Unique, ID};
use uuid::Uuid;

use crate::Session;

/// A player (human or bot) attached to a session.
#[derive(Debug, Clone)]
pub struct Participant {
    id: ID<Self>,
    player_id: Uuid,
    session_id: ID<Session>,
    display_name: String,
    seat_index: Option<u8>,
    is_seated: bool,
    is_ready: bool,
    is_bot: bool,
    score: u32,
    last_heartbeat_at: SystemTime,
    connection_id: Option<Uuid>,
    difficulty: Option<Difficulty>,
}

impl Participant {
    pub fn join(session_id: ID<Session>, player_id: Uuid, display_name: String) -> Self {
        Self {
            id: ID::default(),
            player_id,
            session_id,
            display_name,
            seat_index: None,
            is_seated: false,
            is_ready: false,
            is_bot: false,
            score: 0,
            last_heartbeat_at: SystemTime::now(),
            connection_id: None,
            difficulty: None,
        }
    }

    pub fn join_bot(session_id: ID<Session>, display_name: String, difficulty: Difficulty) -> Self {
        Self {
            is_bot: true,
            difficulty: Some(difficulty),
            ..Self::join(session_id, Uuid::new_v4(), display_name)
        }
    }

    pub fn player_id(&self) -> Uuid {
        self.player_id
    }
    pub fn session_id(&self) -> ID<Session> {
        self.session_id
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn seat_index(&self) -> Option<u8> {
        self.seat_index
    }
    pub fn is_seated(&self) -> bool {
        self.is_seated
    }
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }
    pub fn is_bot(&self) -> bool {
        self.is_bot
    }
    pub fn score(&self) -> u32 {
        self.score
    }
    pub fn last_heartbeat_at(&self) -> SystemTime {
        self.last_heartbeat_at
    }
    pub fn connection_id(&self) -> Option<Uuid> {
        self.connection_id
    }
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// `isSeated ∧ isReady`.
    pub fn is_turn_order_member(&self) -> bool {
        self.is_seated && self.is_ready
    }

    pub fn sit(&mut self, seat: u8) {
        self.seat_index = Some(seat);
        self.is_seated = true;
    }

    /// Standing always clears readiness; `isReady ⇒ isSeated` must hold.
    pub fn stand(&mut self) {
        self.is_seated = false;
        self.is_ready = false;
        self.seat_index = None;
    }

    pub fn set_ready(&mut self, ready: bool) {
        if ready && !self.is_seated {
            return;
        }
        self.is_ready = ready;
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat_at = SystemTime::now();
    }

    pub fn set_connection(&mut self, connection_id: Option<Uuid>) {
        self.connection_id = connection_id;
    }

    pub fn is_stale(&self, threshold: std::time::Duration) -> bool {
        SystemTime::now()
            .duration_since(self.last_heartbeat_at)
            .map(|age| age > threshold)
            .unwrap_or(false)
    }
}

impl Unique for Participant {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant() -> Participant {
        Participant::join(ID::default(), Uuid::new_v4(), "Alice".into())
    }

    #[test]
    fn standing_clears_ready() {
        let mut p = participant();
        p.sit(0);
        p.set_ready(true);
        p.stand();
        assert!(!p.is_seated());
        assert!(!p.is_ready());
    }

    #[test]
    fn ready_requires_seated() {
        let mut p = participant();
        p.set_ready(true);
        assert!(!p.is_ready());
        p.sit(1);
        p.set_ready(true);
        assert!(p.is_ready());
    }

    #[test]
    fn turn_order_membership_needs_both_flags() {
        let mut p = participant();
        assert!(!p.is_turn_order_member());
        p.sit(0);
        assert!(!p.is_turn_order_member());
        p.set_ready(true);
        assert!(p.is_turn_order_member());
    }

    #[test]
    fn stale_after_threshold() {
        let mut p = participant();
        p.heartbeat();
        assert!(!p.is_stale(std::time::Duration::from_secs(45)));
        assert!(p.is_stale(std::time::Duration::from_secs(0)));
    }
}
