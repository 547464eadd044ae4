mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::{Page, Paging, RoomFilter, RoomRegistry};
pub use room::{NewRoom, Room};
