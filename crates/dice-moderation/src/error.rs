#[derive(Debug, Clone, thiserror::Error)]
pub enum ModerationError {
    #[error("sender is muted until {0:?}")]
    Muted(std::time::SystemTime),
    #[error("message blocked by recipient")]
    Blocked,
}
