use dice_core::{Unique, ID};

/// Anonymous identity. A request with no bearer token gets one of these,
/// scoped to the connection; `playerId` stays stable across reconnects
/// only if the client persists it (e.g. in local storage) and replays it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lurker {
    id: ID<Self>,
}

impl Lurker {
    /// A lurker pinned to a caller-supplied id, used when a client replays
    /// a previously-issued anonymous `playerId`.
    pub fn with_id(id: ID<Self>) -> Self {
        Self { id }
    }
}

impl Unique for Lurker {
    fn id(&self) -> ID<Self> {
        self.id
    }
}
