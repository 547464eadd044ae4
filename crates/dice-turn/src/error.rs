use dice_core::ID;
use dice_rules::RulesError;
use dice_sessions::Participant;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TurnError {
    #[error("it is not {0}'s turn")]
    WrongTurn(ID<Participant>),
    #[error("turn engine is not in the expected phase for this action")]
    WrongPhase,
    #[error("cited roll is no longer the active roll")]
    StaleRoll,
    #[error(transparent)]
    InvalidSelection(#[from] RulesError),
}
