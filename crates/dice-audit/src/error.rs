#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Store(#[from] dice_store::StoreError),
    #[error("failed to encode audit record: {0}")]
    Encode(String),
    #[error("failed to decode audit record: {0}")]
    Decode(String),
}
