//! Redirect messages posted back by the authorization frames

use serde::{Deserialize, Serialize};
use url::Url;

/// Which frame a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    /// Interactive sign-in window
    Popup,
    /// Hidden frame used for silent renewal
    RefreshFrame,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectMessage {
    /// Serialized origin of the sender
    pub origin: String,
    pub source: MessageSource,
    /// URL fragment of the redirect, with or without the leading `#`
    pub payload: String,
}

impl RedirectMessage {
    pub fn new(origin: impl Into<String>, source: MessageSource, payload: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            source,
            payload: payload.into(),
        }
    }

    /// Build a message from the full URL the provider redirected to
    pub fn from_redirect_url(url: &Url, source: MessageSource) -> Self {
        Self {
            origin: url.origin().ascii_serialization(),
            source,
            payload: url.fragment().unwrap_or_default().to_string(),
        }
    }
}
