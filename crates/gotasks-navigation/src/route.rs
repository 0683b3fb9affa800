//! View routes addressed by URL fragment
//!
//! - `""`, `#`, `#tasks` → task list of the selected list
//! - `#signin` → sign-in screen
//! - `#taskDetail` → new task form
//! - `#taskDetail-<id>` → edit an existing task
//! - `#setting` → settings

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::NavigationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "task", rename_all = "camelCase")]
pub enum Route {
    Main,
    SignIn,
    /// `None` opens an empty form for a new task
    TaskDetail(Option<String>),
    Setting,
}

impl Route {
    /// Parse a fragment such as `#taskDetail-abc`. Unknown views yield `None`.
    pub fn parse(hash: &str) -> Option<Self> {
        let hash = hash.trim();
        let mut parts = hash.splitn(2, '-');
        let view = parts.next().unwrap_or_default();
        let param = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let route = match view {
            "" | "#" | "#tasks" => Route::Main,
            "#signin" => Route::SignIn,
            "#taskDetail" => Route::TaskDetail(param),
            "#setting" => Route::Setting,
            _ => return None,
        };

        Some(route)
    }

    /// Route addressed by the fragment of a full URL
    pub fn from_url(url: &Url) -> Option<Self> {
        match url.fragment() {
            Some(fragment) => Self::parse(&format!("#{fragment}")),
            None => Some(Route::Main),
        }
    }

    pub fn to_hash(&self) -> String {
        match self {
            Route::Main => "#".to_string(),
            Route::SignIn => "#signin".to_string(),
            Route::TaskDetail(None) => "#taskDetail".to_string(),
            Route::TaskDetail(Some(id)) => format!("#taskDetail-{id}"),
            Route::Setting => "#setting".to_string(),
        }
    }

    /// Whether the route has a view to render
    pub fn has_view(&self) -> bool {
        !matches!(self, Route::SignIn)
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::Main
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hash())
    }
}

impl std::str::FromStr for Route {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| NavigationError::UnknownRoute(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_main_aliases() {
        assert_eq!(Route::parse(""), Some(Route::Main));
        assert_eq!(Route::parse("#"), Some(Route::Main));
        assert_eq!(Route::parse("#tasks"), Some(Route::Main));
    }

    #[test]
    fn test_parse_task_detail() {
        assert_eq!(Route::parse("#taskDetail"), Some(Route::TaskDetail(None)));
        assert_eq!(
            Route::parse("#taskDetail-MTIzNDU"),
            Some(Route::TaskDetail(Some("MTIzNDU".to_string())))
        );
        // Only the first dash separates the view from its parameter
        assert_eq!(
            Route::parse("#taskDetail-a-b"),
            Some(Route::TaskDetail(Some("a-b".to_string())))
        );
        assert_eq!(Route::parse("#taskDetail-"), Some(Route::TaskDetail(None)));
    }

    #[test]
    fn test_unknown_route() {
        assert!(Route::parse("#nope").is_none());
        assert!(Route::parse("tasks").is_none());
        assert!("#nope".parse::<Route>().is_err());
    }

    #[test]
    fn test_hash_round_trip() {
        for route in [
            Route::Main,
            Route::SignIn,
            Route::TaskDetail(None),
            Route::TaskDetail(Some("t1".to_string())),
            Route::Setting,
        ] {
            assert_eq!(Route::parse(&route.to_hash()), Some(route));
        }
    }

    #[test]
    fn test_from_url() {
        let url = Url::parse("http://localhost:8080/#setting").unwrap();
        assert_eq!(Route::from_url(&url), Some(Route::Setting));

        let url = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(Route::from_url(&url), Some(Route::Main));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&Route::TaskDetail(Some("t1".to_string()))).unwrap();
        assert_eq!(json, r#"{"view":"taskDetail","task":"t1"}"#);
    }
}
