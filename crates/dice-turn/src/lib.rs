//! The turn state machine: a single canonical `TurnState` per session,
//! advanced by an explicit phase enum rather than callbacks. No transport
//! or storage concerns live here; the room owner task in `dice-transport`
//! drives `TurnEngine` and broadcasts the `TurnEvent`s it returns.
mod config;
mod engine;
mod error;
mod event;
mod phase;
mod roll;
mod score_log;

pub use config::{turn_timeout, QUEUE_NEXT_DELAY, TURN_WARNING_LEAD};
pub use engine::TurnEngine;
pub use error::TurnError;
pub use event::TurnEvent;
pub use phase::Phase;
pub use roll::ActiveRoll;
pub use score_log::ScoreLogEntry;
