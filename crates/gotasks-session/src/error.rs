//! Authentication error types

use thiserror::Error;

use crate::state::AuthState;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Returned state does not match the authorization attempt")]
    StateMismatch,

    #[error("Authorization provider returned an error: {0}")]
    ProviderError(String),

    #[error("Token audience mismatch: expected {expected}, got {actual}")]
    AudienceMismatch { expected: String, actual: String },

    #[error("Token scope mismatch: expected {expected}, got {actual}")]
    ScopeMismatch { expected: String, actual: String },

    #[error("Redirect did not carry an access token")]
    MissingAccessToken,

    #[error("Token introspection failed: {0}")]
    Introspection(String),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: AuthState, to: AuthState },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] gotasks_storage::StorageError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
