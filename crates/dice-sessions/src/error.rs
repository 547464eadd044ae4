use dice_core::ID;

use crate::{Participant, Session};

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    SessionNotFound(ID<Session>),
    #[error("participant {0} not found")]
    ParticipantNotFound(ID<Participant>),
    #[error("seat {0} is already taken")]
    SeatTaken(u8),
    #[error("seat index {0} is out of range")]
    SeatOutOfRange(u8),
    #[error("session {0} is already closed")]
    SessionClosed(ID<Session>),
}
