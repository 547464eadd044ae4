#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Room(#[from] dice_rooms::RoomError),
    #[error(transparent)]
    Session(#[from] dice_sessions::SessionError),
    #[error(transparent)]
    Store(#[from] dice_store::StoreError),
    #[error(transparent)]
    Audit(#[from] dice_audit::AuditError),
    #[error("failed to decode record: {0}")]
    Decode(String),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}
