//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] gotasks_storage::StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] gotasks_session::AuthError),

    #[error("Task service error: {0}")]
    Api(#[from] gotasks_tasks::ApiError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] gotasks_navigation::NavigationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),
}

impl CoreError {
    /// The call was parked behind a token refresh and will be replayed
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Api(e) if e.is_unauthorized())
    }
}
