use dice_core::ID;

use crate::Room;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(ID<Room>),
    #[error("no room found matching code")]
    CodeNotFound,
    #[error("room {0} is full")]
    Full(ID<Room>),
    #[error("caller is banned from room {0}")]
    Banned(ID<Room>),
    #[error("room {0} is closed")]
    Closed(ID<Room>),
}
