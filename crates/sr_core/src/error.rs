use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid participant record: {0}")]
    InvalidRecord(String),

    #[error("Readiness probe '{name}' failed: {reason}")]
    Probe { name: String, reason: String },

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Malformed feed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Leaderboard store error: {0}")]
    Store(String),
}

impl CoreError {
    /// Whether the coordinator may keep running on its last-known state
    /// after this error. Only malformed local records are fatal to the
    /// operation that produced them.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::InvalidRecord(_) => false,
            CoreError::Probe { .. } => true,
            CoreError::Feed(_) => true,
            CoreError::Payload(_) => true,
            CoreError::Store(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
