use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One matched-term hit, retained in a player's conduct history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub at: SystemTime,
    pub term: String,
}

/// Per-player moderation state, minus the per-room `banRooms` set, which
/// `dice-rooms::Room::ban` tracks directly against the room the player
/// was actually banned from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConductRecord {
    pub strikes: u32,
    pub mute_until: Option<SystemTime>,
    pub banned: bool,
    pub history: History,
}

/// Fixed-capacity ring buffer of the most recent moderation events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History(Vec<ModerationEvent>);

impl History {
    pub fn push(&mut self, event: ModerationEvent) {
        self.0.push(event);
    }

    /// Drops the oldest entries once the buffer exceeds `capacity`.
    pub fn truncate_to_ring(&mut self, capacity: usize) {
        if self.0.len() > capacity {
            let overflow = self.0.len() - capacity;
            self.0.drain(0..overflow);
        }
    }

    pub fn as_slice(&self) -> &[ModerationEvent] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_drops_oldest_past_capacity() {
        let mut history = History::default();
        for i in 0..5 {
            history.push(ModerationEvent {
                at: SystemTime::now(),
                term: format!("term-{i}"),
            });
        }
        history.truncate_to_ring(3);
        assert_eq!(history.as_slice().len(), 3);
        assert_eq!(history.as_slice()[0].term, "term-2");
    }
}
