//! Session State Machine
//!
//! ```text
//! Unauthenticated
//!   ↓ begin_authorization
//! AwaitingInitialGrant
//!   ↓ token redeemed
//! Authenticated  ⇄  AwaitingRefresh
//!   (a 401 during sign-in also moves AwaitingInitialGrant → AwaitingRefresh)
//!   ↓ logout (from any state)
//! Unauthenticated
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// No trusted token
    Unauthenticated,
    /// Popup opened, waiting for the first redirect
    AwaitingInitialGrant,
    /// A token passed introspection
    Authenticated,
    /// Hidden frame navigated, waiting for a renewed token
    AwaitingRefresh,
}

impl AuthState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: AuthState) -> bool {
        match (self, target) {
            // Logout is always allowed
            (_, AuthState::Unauthenticated) => true,
            // Sign-in can always be (re)started
            (_, AuthState::AwaitingInitialGrant) => true,
            // A returning user has the logged-in flag but no token in this process
            (AuthState::Unauthenticated, AuthState::AwaitingRefresh) => true,
            (AuthState::Authenticated, AuthState::AwaitingRefresh) => true,
            (AuthState::AwaitingRefresh, AuthState::AwaitingRefresh) => true,
            // A stored token rejected while the popup is still open
            (AuthState::AwaitingInitialGrant, AuthState::AwaitingRefresh) => true,
            // Redemption
            (AuthState::AwaitingInitialGrant, AuthState::Authenticated) => true,
            (AuthState::AwaitingRefresh, AuthState::Authenticated) => true,
            // A second overlapping flow completing
            (AuthState::Authenticated, AuthState::Authenticated) => true,
            _ => false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            AuthState::AwaitingInitialGrant | AuthState::AwaitingRefresh
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::AwaitingInitialGrant => "awaiting_initial_grant",
            AuthState::Authenticated => "authenticated",
            AuthState::AwaitingRefresh => "awaiting_refresh",
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
