#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no document at {section}/{key}")]
    NotFound { section: String, key: String },
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("permanent store failure: {0}")]
    Permanent(String),
}

impl StoreError {
    pub fn not_found(section: &str, key: &str) -> Self {
        Self::NotFound {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// True for failures callers should retry with `dice_core::Backoff`.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
