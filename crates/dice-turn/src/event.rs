use dice_core::{Count, ID};
use dice_rules::Die;
use dice_sessions::Participant;
use uuid::Uuid;

use crate::{ActiveRoll, Phase};

/// Events the engine commits, in the exact order the room owner task should
/// broadcast them. `dice-stream` adapts these into wire-level frame
/// categories alongside chat/moderation/session events that don't
/// originate here.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    TurnStart {
        round_index: u32,
        participant_id: ID<Participant>,
    },
    RollResult {
        server_roll_id: Uuid,
        roll_index: u32,
        dice: Vec<Die>,
    },
    ScoreCommitted {
        participant_id: ID<Participant>,
        roll_index: u32,
        dice_selection: Vec<ID<Die>>,
        points: Count,
    },
    TurnEnd {
        participant_id: ID<Participant>,
        pool_exhausted: bool,
    },
    TimeoutAutoAdvance {
        participant_id: ID<Participant>,
        phase: Phase,
    },
    MatchComplete {
        scores: Vec<(ID<Participant>, Count)>,
    },
}

impl From<&ActiveRoll> for TurnEvent {
    fn from(roll: &ActiveRoll) -> Self {
        TurnEvent::RollResult {
            server_roll_id: roll.server_roll_id,
            roll_index: roll.roll_index,
            dice: roll.dice.clone(),
        }
    }
}
