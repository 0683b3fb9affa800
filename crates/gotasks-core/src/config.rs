//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use gotasks_session::AuthConfig;

use crate::error::CoreError;
use crate::Result;

/// Environment variable overriding the OAuth2 client id
pub const CLIENT_ID_ENV: &str = "GOTASKS_CLIENT_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// OAuth2 client id registered with the provider
    pub client_id: String,
    /// Scope requested and expected back from introspection
    pub scope: String,
    pub authorization_endpoint: String,
    pub introspection_endpoint: String,
    /// Base URL of the task service
    pub tasks_api_base: String,
    /// Where the provider sends the token fragment
    pub redirect_uri: String,
    /// Only redirect messages from this origin are trusted
    pub app_origin: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("gotasks.db"),
            client_id: String::new(),
            scope: "https://www.googleapis.com/auth/tasks".to_string(),
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            introspection_endpoint: "https://www.googleapis.com/oauth2/v3/tokeninfo".to_string(),
            tasks_api_base: gotasks_tasks::TASKS_API_BASE.to_string(),
            redirect_uri: "http://localhost:8080/oauth2callback.html".to_string(),
            app_origin: "http://localhost:8080".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("gotasks"))
            .unwrap_or_else(|| PathBuf::from(".gotasks"))
    }

    /// Read a JSON config file; missing keys take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `GOTASKS_CLIENT_ID` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(client_id) = std::env::var(CLIENT_ID_ENV) {
            if !client_id.trim().is_empty() {
                self.client_id = client_id.trim().to_string();
            }
        }
        self
    }

    pub fn auth_config(&self) -> Result<AuthConfig> {
        if self.client_id.trim().is_empty() {
            return Err(CoreError::Config(format!(
                "client_id is not set (use the config file or {})",
                CLIENT_ID_ENV
            )));
        }

        Ok(AuthConfig {
            client_id: self.client_id.clone(),
            scope: self.scope.clone(),
            authorization_endpoint: Url::parse(&self.authorization_endpoint)?,
            introspection_endpoint: Url::parse(&self.introspection_endpoint)?,
            redirect_uri: Url::parse(&self.redirect_uri)?,
        })
    }

    pub fn tasks_api_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.tasks_api_base)?)
    }

    /// Serialized origin, e.g. `http://localhost:8080`
    pub fn origin(&self) -> Result<String> {
        Ok(Url::parse(&self.app_origin)?.origin().ascii_serialization())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_google() {
        let config = Config::new(PathBuf::from("/tmp/gotasks"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/gotasks/gotasks.db"));
        assert_eq!(config.origin().unwrap(), "http://localhost:8080");
        assert!(config.tasks_api_url().unwrap().as_str().starts_with("https://www.googleapis.com/tasks/v1"));
    }

    #[test]
    fn test_missing_client_id_is_a_config_error() {
        let config = Config::new(PathBuf::from("/tmp/gotasks"));
        assert!(matches!(config.auth_config(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"client_id":"abc.apps.googleusercontent.com"}"#).unwrap();
        let auth = config.auth_config().unwrap();

        assert_eq!(auth.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(auth.scope, "https://www.googleapis.com/auth/tasks");
        assert_eq!(auth.redirect_uri.path(), "/oauth2callback.html");
    }
}
