//! Token introspection

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

use crate::error::AuthError;
use crate::Result;

/// Claims returned by the tokeninfo endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub scope: String,
    /// Seconds until expiry. Google sends this as a string.
    #[serde(deserialize_with = "seconds_from_string_or_number")]
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct IntrospectionErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

fn seconds_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn introspect(&self, access_token: &str) -> Result<TokenInfo>;
}

/// `POST <endpoint>?access_token=<token>`
pub struct HttpIntrospector {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpIntrospector {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl TokenIntrospector for HttpIntrospector {
    async fn introspect(&self, access_token: &str) -> Result<TokenInfo> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("access_token", access_token);

        let response = self.client.post(url).send().await?;
        let status = response.status();

        if status.is_success() {
            let info = response
                .json::<TokenInfo>()
                .await
                .map_err(|e| AuthError::Introspection(e.to_string()))?;
            return Ok(info);
        }

        let message = match response.json::<IntrospectionErrorBody>().await {
            Ok(body) => body
                .error
                .or(body.error_description)
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };

        tracing::warn!(status = %status, error = %message, "Token introspection rejected");

        Err(AuthError::Introspection(message))
    }
}
