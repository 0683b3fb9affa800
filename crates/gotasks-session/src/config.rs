//! OAuth2 client identity

use serde::{Deserialize, Serialize};
use url::Url;

use crate::csrf::CsrfState;
use crate::Result;

pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKENINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";
pub const TASKS_SCOPE: &str = "https://www.googleapis.com/auth/tasks";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth2 client id, also the expected `aud` claim
    pub client_id: String,
    /// The single scope requested; introspection must echo it exactly
    pub scope: String,
    pub authorization_endpoint: Url,
    pub introspection_endpoint: Url,
    pub redirect_uri: Url,
}

impl AuthConfig {
    /// Google endpoints with the Tasks scope
    pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> Result<Self> {
        Ok(Self {
            client_id: client_id.into(),
            scope: TASKS_SCOPE.to_string(),
            authorization_endpoint: Url::parse(GOOGLE_AUTHORIZATION_ENDPOINT)?,
            introspection_endpoint: Url::parse(GOOGLE_TOKENINFO_ENDPOINT)?,
            redirect_uri,
        })
    }

    /// Implicit-flow authorization request carrying `state`
    pub fn authorization_url(&self, state: &CsrfState) -> Url {
        let mut url = self.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "token")
            .append_pair("scope", &self.scope)
            .append_pair("state", state.as_str());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let config = AuthConfig::new(
            "client-123.apps.googleusercontent.com",
            Url::parse("http://localhost:8080/oauth2callback.html").unwrap(),
        )
        .unwrap();
        let state = CsrfState::generate();
        let url = config.authorization_url(&state);

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "client_id".to_string(),
                    "client-123.apps.googleusercontent.com".to_string()
                ),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:8080/oauth2callback.html".to_string()
                ),
                ("response_type".to_string(), "token".to_string()),
                ("scope".to_string(), TASKS_SCOPE.to_string()),
                ("state".to_string(), state.as_str().to_string()),
            ]
        );
    }
}
