use std::time::SystemTime;

use dice_core::{Unique, ID};
use dice_rooms::Room;

/// The per-room game state container; 1:1 with an active `Room`.
/// Turn state and score log live in `dice-turn`/`dice-leaderboard`, keyed by
/// this session's id, to avoid a dependency cycle back into this crate.
#[derive(Debug, Clone)]
pub struct Session {
    id: ID<Self>,
    room_id: ID<Room>,
    created_at: SystemTime,
    closed_at: Option<SystemTime>,
}

impl Session {
    pub fn open(room_id: ID<Room>) -> Self {
        Self {
            id: ID::default(),
            room_id,
            created_at: SystemTime::now(),
            closed_at: None,
        }
    }

    pub fn room_id(&self) -> ID<Room> {
        self.room_id
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
    pub fn closed_at(&self) -> Option<SystemTime> {
        self.closed_at
    }
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn close(&mut self) {
        if self.closed_at.is_none() {
            self.closed_at = Some(SystemTime::now());
        }
    }
}

impl Unique for Session {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_is_idempotent() {
        let mut s = Session::open(ID::default());
        s.close();
        let first = s.closed_at();
        s.close();
        assert_eq!(s.closed_at(), first);
    }
}
