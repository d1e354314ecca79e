use thiserror::Error;

/// Failures of the synchronization pipeline, as reported back to watchers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Credentials or the target repository are missing. Needs user setup.
    #[error("{0}")]
    Config(String),

    /// The token was rejected. Needs a new login.
    #[error("{0}")]
    Auth(String),

    /// The remote refused the write, or the write never reached it.
    #[error("GitHub API error: {} - {message}", display_status(.status))]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "network".to_string(),
    }
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> SyncError {
        SyncError::Config(message.into())
    }

    pub fn auth(message: impl Into<String>) -> SyncError {
        SyncError::Auth(message.into())
    }
}
