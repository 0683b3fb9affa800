//! Redirect fragment parsing

use std::collections::HashMap;

/// Key-value pairs from `redirect_uri#access_token=..&state=..&expires_in=..`
#[derive(Debug, Clone, Default)]
pub struct RedirectFragment {
    params: HashMap<String, String>,
}

impl RedirectFragment {
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim();
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        let params = url::form_urlencoded::parse(fragment.as_bytes())
            .into_owned()
            .collect();

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get("access_token")
    }

    pub fn error(&self) -> Option<&str> {
        self.get("error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_fragment() {
        let fragment = RedirectFragment::parse(
            "#access_token=ya29.a0Af&token_type=Bearer&expires_in=3599&state=abc.def&scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Ftasks",
        );
        assert_eq!(fragment.access_token(), Some("ya29.a0Af"));
        assert_eq!(fragment.state(), Some("abc.def"));
        assert_eq!(
            fragment.get("scope"),
            Some("https://www.googleapis.com/auth/tasks")
        );
        assert!(fragment.error().is_none());
    }

    #[test]
    fn test_parse_error_fragment() {
        let fragment = RedirectFragment::parse("error=access_denied&state=s.t");
        assert_eq!(fragment.error(), Some("access_denied"));
        assert!(fragment.access_token().is_none());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let fragment = RedirectFragment::parse("state=&error=");
        assert!(fragment.state().is_none());
        assert!(fragment.error().is_none());
    }
}
