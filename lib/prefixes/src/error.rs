use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PrefixStoreError {
    #[error("prefix '{0}' is already registered")]
    AlreadyExists(String),
    #[error("prefix '{0}' is not registered")]
    NotFound(String),
    #[error("failed to persist prefix table: {0}")]
    Io(#[from] io::Error),
    #[error("prefix file is not valid JSON: {0}")]
    Corrupted(#[from] serde_json::Error),
}
