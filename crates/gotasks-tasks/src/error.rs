//! Task service error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The token was rejected; a replay has been queued behind a refresh
    #[error("Task service returned 401; retry queued behind token refresh")]
    Unauthorized,

    #[error("{code}: {message}")]
    Api { code: u16, message: String },

    /// Clearing completed tasks failed; the cause is only logged
    #[error("clear error")]
    ClearFailed,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Session error: {0}")]
    Auth(#[from] gotasks_session::AuthError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
