pub mod admin;
pub mod identity;
pub mod leaderboard;
pub mod rooms;
pub mod sessions;
pub mod stream;

use std::time::SystemTime;

use dice_core::Unique;
use dice_rooms::Room;

pub(crate) fn millis(at: SystemTime) -> u128 {
    at.duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

/// `Room` carries no `Serialize` impl (it lives alongside the registry's
/// own internal bookkeeping); every route that hands a room back to a
/// client builds its wire view through this one function instead of each
/// route inlining its own field list.
pub(crate) fn room_view(room: &Room) -> serde_json::Value {
    serde_json::json!({
        "id": room.id(),
        "code": room.code(),
        "name": room.name(),
        "difficulty": room.difficulty(),
        "visibility": room.visibility(),
        "maxPlayers": room.max_players(),
        "turnMode": room.turn_mode(),
        "status": room.status(),
        "seatedHumans": room.seated_humans(),
        "createdAt": millis(room.created_at()),
        "lastActivityAt": millis(room.last_activity_at()),
    })
}
