use dice_core::ID;
use dice_rooms::Room;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    #[error("room {0} has no active stream")]
    RoomNotFound(ID<Room>),
}
