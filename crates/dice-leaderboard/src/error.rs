#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error(transparent)]
    Store(#[from] dice_store::StoreError),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("failed to decode record: {0}")]
    Decode(String),
    #[error("profile {0} not found")]
    ProfileNotFound(uuid::Uuid),
    #[error("only federated identities may write settings")]
    SettingsRequireFederatedIdentity,
    #[error("unknown leaderboard mode '{0}'")]
    UnknownMode(String),
    #[error("unknown leaderboard window '{0}'")]
    UnknownWindow(String),
}
