use serde::Serialize;

/// Wire-level event categories. The payload is left as
/// `serde_json::Value` here; `dice-transport` is the only crate that knows
/// the concrete frame shapes (it assembles them from `dice-turn`/
/// `dice-sessions`/`dice-moderation` types before publishing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TurnStart,
    RollResult,
    ScoreCommitted,
    TurnEnd,
    ParticipantJoined,
    ParticipantState,
    SessionState,
    ChatMessage,
    SystemNotification,
    ModerationEvent,
    ChaosEvent,
    RoomClosed,
}

#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub kind: EventKind,
    pub payload: serde_json::Value,
}

impl StreamEvent {
    pub fn new(kind: EventKind, payload: impl Serialize) -> Self {
        Self {
            kind,
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }
}
