use dice_core::{Count, Unique, ID};
use serde::{Deserialize, Serialize};

/// The seven polyhedral die kinds the pool can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieKind {
    /// Highest face a die of this kind can show.
    pub const fn max_face(self) -> u8 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }
}

/// A single die within a session's pool, tracked across the whole match
/// (not just the current roll) so `scored`/`in_play` survive between rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    id: ID<Die>,
    kind: DieKind,
    value: u8,
    in_play: bool,
    scored: bool,
}

impl Die {
    pub fn new(kind: DieKind) -> Self {
        Self {
            id: ID::default(),
            kind,
            value: 0,
            in_play: true,
            scored: false,
        }
    }

    pub fn kind(&self) -> DieKind {
        self.kind
    }
    pub fn value(&self) -> u8 {
        self.value
    }
    pub fn in_play(&self) -> bool {
        self.in_play
    }
    pub fn scored(&self) -> bool {
        self.scored
    }

    /// True iff this die can be rolled or selected this turn: still in the
    /// pool and not already banked.
    pub fn is_live(&self) -> bool {
        self.in_play && !self.scored
    }

    /// Points this die is worth if scored right now: `maxFace(kind) - value`.
    /// Lowest cumulative total wins the match.
    pub fn points(&self) -> Count {
        (self.kind.max_face() - self.value) as Count
    }

    pub fn set_value(&mut self, value: u8) {
        debug_assert!(value >= 1 && value <= self.kind.max_face());
        self.value = value;
    }

    pub fn mark_scored(&mut self) {
        self.scored = true;
        self.in_play = false;
    }

    /// Construct a die with an explicit id/value, used by tests and by
    /// replay to pin down exact fixtures.
    pub fn fixture(id: ID<Die>, kind: DieKind, value: u8) -> Self {
        Self {
            id,
            kind,
            value,
            in_play: true,
            scored: false,
        }
    }
}

impl Unique for Die {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_face_matches_die_kind() {
        assert_eq!(DieKind::D6.max_face(), 6);
        assert_eq!(DieKind::D100.max_face(), 100);
    }

    #[test]
    fn points_is_max_face_minus_value() {
        let mut die = Die::new(DieKind::D6);
        die.set_value(6);
        assert_eq!(die.points(), 0);
        die.set_value(1);
        assert_eq!(die.points(), 5);
    }

    #[test]
    fn marking_scored_retires_the_die() {
        let mut die = Die::new(DieKind::D6);
        die.set_value(3);
        assert!(die.is_live());
        die.mark_scored();
        assert!(!die.is_live());
        assert!(die.scored());
        assert!(!die.in_play());
    }
}
