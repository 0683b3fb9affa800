//! gotasks Session Management
//!
//! OAuth2 implicit flow against the task provider:
//! - the initial grant is requested in a popup
//! - an expired token is renewed silently through a hidden frame
//! - every redirect is checked against a single-use CSRF state, then the
//!   token's audience and scope are verified by introspection
//! - API calls that hit 401 park a replayable continuation here and are
//!   re-issued once the refreshed token arrives

mod config;
mod continuation;
mod csrf;
mod error;
mod fragment;
mod introspection;
mod launcher;
mod manager;
mod state;

pub use config::AuthConfig;
pub use continuation::{ApiCall, ApiRequest, Continuation, ContinuationRunner, HttpMethod};
pub use csrf::CsrfState;
pub use error::AuthError;
pub use fragment::RedirectFragment;
pub use introspection::{HttpIntrospector, TokenInfo, TokenIntrospector};
pub use launcher::{AuthorizationLauncher, LaunchTarget, RecordingLauncher};
pub use manager::{keys, Redemption, SessionManager};
pub use state::AuthState;

pub type Result<T> = std::result::Result<T, AuthError>;
