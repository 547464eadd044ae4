//! Small shared enums referenced across the room/session/turn/bot crates.
//! Kept here (rather than in any one of those crates) so none of them needs
//! to depend on another just to name a room's difficulty or turn mode.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Normal => write!(f, "normal"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnMode {
    RollByRoll,
    FullTurnRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Lobby,
    Active,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_displays_lowercase() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn difficulty_all_has_three_entries() {
        assert_eq!(Difficulty::ALL.len(), 3);
    }
}
