use serde::{Deserialize, Serialize};

/// The turn engine's FSM phase. `turnMode=fullTurnRound` reuses the exact
/// same phases; only the round-completion predicate in
/// `TurnEngine::advance_after_turn` differs between the two modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    WaitingReady,
    PreRoll,
    PostRoll,
    Resolving,
    BetweenTurns,
    MatchComplete,
}
