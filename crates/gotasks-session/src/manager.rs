//! Session Manager
//!
//! Owns the implicit-flow handshake, token validation and the queue of
//! continuations waiting on a silent refresh.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;

use gotasks_storage::{Database, KeyValueStore, StorageScope};

use crate::config::AuthConfig;
use crate::continuation::{Continuation, ContinuationRunner};
use crate::csrf::{CsrfState, STORAGE_PREFIX};
use crate::error::AuthError;
use crate::fragment::RedirectFragment;
use crate::introspection::TokenIntrospector;
use crate::launcher::AuthorizationLauncher;
use crate::state::AuthState;
use crate::Result;

/// Storage keys
pub mod keys {
    /// Session scope: bearer token
    pub const TOKEN: &str = "token";
    /// Session scope: absolute expiry in epoch milliseconds
    pub const TOKEN_EXPIRATION: &str = "token-expiration";
    /// Local scope: set after the first successful sign-in
    pub const LOGGED_IN: &str = "logged-in";
    /// Local scope: task list shown on the main view
    pub const SELECTED_TASK_LIST: &str = "selectedTaskLists";
}

/// Unredeemed CSRF states older than this are dropped
const STATE_TTL_SECS: i64 = 30 * 60;

/// Result of a successful redemption
#[derive(Debug)]
pub enum Redemption<O> {
    /// Popup sign-in completed; the caller shows the default view
    SignedIn,
    /// Silent refresh completed; outcomes of the drained continuations in
    /// registration order
    Refreshed(Vec<O>),
}

pub struct SessionManager {
    config: Arc<AuthConfig>,
    /// Persistence for token, CSRF state and the logged-in flag
    db: Database,
    state: Arc<RwLock<AuthState>>,
    /// Continuations waiting for the next refreshed token
    pending: Arc<Mutex<VecDeque<Continuation>>>,
    launcher: Arc<dyn AuthorizationLauncher>,
    introspector: Arc<dyn TokenIntrospector>,
}

impl SessionManager {
    pub fn new(
        config: AuthConfig,
        db: Database,
        launcher: Arc<dyn AuthorizationLauncher>,
        introspector: Arc<dyn TokenIntrospector>,
    ) -> Self {
        let initial = match db.get(StorageScope::Session, keys::TOKEN) {
            Ok(Some(_)) => AuthState::Authenticated,
            _ => AuthState::Unauthenticated,
        };

        Self {
            config: Arc::new(config),
            db,
            state: Arc::new(RwLock::new(initial)),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            launcher,
            introspector,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn state(&self) -> AuthState {
        *self.state.read()
    }

    fn ensure_can_transition(&self, target: AuthState) -> Result<()> {
        let current = *self.state.read();
        if !current.can_transition_to(target) {
            return Err(AuthError::InvalidTransition {
                from: current,
                to: target,
            });
        }
        Ok(())
    }

    fn transition(&self, target: AuthState) -> Result<()> {
        let mut state = self.state.write();
        if !state.can_transition_to(target) {
            return Err(AuthError::InvalidTransition {
                from: *state,
                to: target,
            });
        }

        if *state != target {
            tracing::debug!(from = %*state, to = %target, "Session state changed");
        }
        *state = target;
        Ok(())
    }

    /// Persist a fresh CSRF state and build the authorization URL for it
    fn prepare_attempt(&self) -> Result<(CsrfState, url::Url)> {
        // Attempts whose redirect never arrived, or arrived without a
        // usable state
        self.db.remove_stale(
            StorageScope::Session,
            STORAGE_PREFIX,
            Utc::now() - TimeDelta::seconds(STATE_TTL_SECS),
        )?;

        let csrf = CsrfState::generate();
        self.db
            .set(StorageScope::Session, &csrf.storage_key(), csrf.as_str())?;
        let url = self.config.authorization_url(&csrf);
        Ok((csrf, url))
    }

    /// Start the interactive sign-in in a popup
    pub fn begin_authorization(&self) -> Result<()> {
        self.transition(AuthState::AwaitingInitialGrant)?;
        let (csrf, url) = self.prepare_attempt()?;

        tracing::info!(flow_id = %csrf.flow_id(), "Opening sign-in popup");
        self.launcher.open_popup(&url);

        Ok(())
    }

    /// Park `continuation` and renew the token through the hidden frame.
    ///
    /// Triggers are not deduplicated: every call navigates the frame again.
    pub fn begin_refresh(&self, continuation: Continuation) -> Result<()> {
        self.transition(AuthState::AwaitingRefresh)?;

        let queued = {
            let mut pending = self.pending.lock();
            pending.push_back(continuation);
            pending.len()
        };

        let (csrf, url) = self.prepare_attempt()?;

        tracing::info!(
            flow_id = %csrf.flow_id(),
            pending = queued,
            "Refreshing access token"
        );
        self.launcher.navigate_refresh_frame(&url);

        Ok(())
    }

    /// Validate a redirect fragment and store the token it carries.
    ///
    /// `is_popup` marks the initial sign-in. Otherwise this is a silent
    /// refresh and every pending continuation is run through `runner`.
    pub async fn redeem_token<R>(
        &self,
        fragment: &str,
        is_popup: bool,
        runner: &R,
    ) -> Result<Redemption<R::Outcome>>
    where
        R: ContinuationRunner + ?Sized,
    {
        let fragment = RedirectFragment::parse(fragment);

        self.consume_state(fragment.state())?;

        if let Some(error) = fragment.error() {
            tracing::warn!(error = %error, "Authorization provider returned an error");
            return Err(AuthError::ProviderError(error.to_string()));
        }

        let access_token = fragment
            .access_token()
            .ok_or(AuthError::MissingAccessToken)?;

        let info = self.introspector.introspect(access_token).await?;

        if info.aud != self.config.client_id {
            tracing::warn!(aud = %info.aud, "Token issued for another client");
            return Err(AuthError::AudienceMismatch {
                expected: self.config.client_id.clone(),
                actual: info.aud,
            });
        }

        if info.scope != self.config.scope {
            tracing::warn!(scope = %info.scope, "Token scope differs from the requested scope");
            return Err(AuthError::ScopeMismatch {
                expected: self.config.scope.clone(),
                actual: info.scope,
            });
        }

        let expires_at = i64::try_from(info.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::Introspection(format!("expires_in out of range: {}", info.expires_in))
            })?;

        self.ensure_can_transition(AuthState::Authenticated)?;

        self.db
            .set(StorageScope::Session, keys::TOKEN, access_token)?;
        self.db.set(
            StorageScope::Session,
            keys::TOKEN_EXPIRATION,
            &expires_at.timestamp_millis().to_string(),
        )?;

        self.transition(AuthState::Authenticated)?;

        tracing::info!(expires_at = %expires_at, is_popup, "Access token stored");

        if is_popup {
            self.db
                .set(StorageScope::Local, keys::LOGGED_IN, keys::LOGGED_IN)?;
            return Ok(Redemption::SignedIn);
        }

        Ok(Redemption::Refreshed(self.drain_pending(runner).await))
    }

    /// The stored state for the echoed attempt is removed whether or not it
    /// matches, so each state can be redeemed at most once.
    fn consume_state(&self, returned: Option<&str>) -> Result<()> {
        let Some(returned) = returned.and_then(CsrfState::parse) else {
            tracing::warn!("Redirect carried no recognizable state");
            return Err(AuthError::StateMismatch);
        };

        let stored = self
            .db
            .take(StorageScope::Session, &returned.storage_key())?;

        if stored.as_deref() != Some(returned.as_str()) {
            tracing::warn!(flow_id = %returned.flow_id(), "State mismatch");
            return Err(AuthError::StateMismatch);
        }

        Ok(())
    }

    /// Take every parked continuation and run them.
    ///
    /// Continuations parked while this batch runs stay queued for the
    /// refresh they triggered.
    async fn drain_pending<R>(&self, runner: &R) -> Vec<R::Outcome>
    where
        R: ContinuationRunner + ?Sized,
    {
        let batch: Vec<Continuation> = self.pending.lock().drain(..).collect();

        tracing::debug!(count = batch.len(), "Resuming pending continuations");

        join_all(batch.into_iter().map(|c| runner.run(c))).await
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Copy of the queue in retry order
    pub fn pending_snapshot(&self) -> Vec<Continuation> {
        self.pending.lock().iter().cloned().collect()
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.db.get(StorageScope::Session, keys::TOKEN)?)
    }

    pub fn token_expires_at(&self) -> Result<Option<DateTime<Utc>>> {
        let stored = self.db.get(StorageScope::Session, keys::TOKEN_EXPIRATION)?;
        Ok(stored
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }

    /// A missing expiry counts as expired
    pub fn is_token_expired_at(&self, now: DateTime<Utc>) -> Result<bool> {
        Ok(match self.token_expires_at()? {
            Some(expires_at) => now > expires_at,
            None => true,
        })
    }

    pub fn is_token_expired(&self) -> Result<bool> {
        self.is_token_expired_at(Utc::now())
    }

    pub fn is_logged_in(&self) -> Result<bool> {
        Ok(self.db.contains(StorageScope::Local, keys::LOGGED_IN)?)
    }

    /// Forget the user: durable storage is wiped and the token dropped.
    ///
    /// The grant itself is not revoked with the provider.
    pub fn logout(&self) -> Result<()> {
        self.db.clear(StorageScope::Local)?;
        self.db.remove(StorageScope::Session, keys::TOKEN_EXPIRATION)?;
        self.db.remove(StorageScope::Session, keys::TOKEN)?;

        let dropped = {
            let mut pending = self.pending.lock();
            let n = pending.len();
            pending.clear();
            n
        };

        self.transition(AuthState::Unauthenticated)?;

        tracing::info!(dropped_continuations = dropped, "Logged out");

        Ok(())
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            db: self.db.clone(),
            state: Arc::clone(&self.state),
            pending: Arc::clone(&self.pending),
            launcher: Arc::clone(&self.launcher),
            introspector: Arc::clone(&self.introspector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuation::{ApiCall, ApiRequest, HttpMethod};
    use crate::introspection::TokenInfo;
    use crate::launcher::{LaunchTarget, RecordingLauncher};
    use async_trait::async_trait;
    use chrono::Duration;
    use gotasks_navigation::Route;
    use url::Url;

    const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";

    struct StubIntrospector {
        info: TokenInfo,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TokenIntrospector for StubIntrospector {
        async fn introspect(&self, access_token: &str) -> Result<TokenInfo> {
            self.calls.lock().push(access_token.to_string());
            Ok(self.info.clone())
        }
    }

    /// Records what it ran
    struct Recorder {
        ran: Mutex<Vec<Continuation>>,
    }

    #[async_trait]
    impl ContinuationRunner for Recorder {
        type Outcome = usize;

        async fn run(&self, continuation: Continuation) -> usize {
            let mut ran = self.ran.lock();
            ran.push(continuation);
            ran.len()
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            ran: Mutex::new(Vec::new()),
        }
    }

    struct Fixture {
        manager: SessionManager,
        launcher: RecordingLauncher,
        db: Database,
        introspections: Arc<Mutex<Vec<String>>>,
    }

    fn fixture_with(info: TokenInfo) -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let launcher = RecordingLauncher::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let config = AuthConfig::new(
            CLIENT_ID,
            Url::parse("http://localhost:8080/oauth2callback.html").unwrap(),
        )
        .unwrap();

        let manager = SessionManager::new(
            config,
            db.clone(),
            Arc::new(launcher.clone()),
            Arc::new(StubIntrospector {
                info,
                calls: Arc::clone(&calls),
            }),
        );

        Fixture {
            manager,
            launcher,
            db,
            introspections: calls,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(TokenInfo {
            aud: CLIENT_ID.to_string(),
            scope: crate::config::TASKS_SCOPE.to_string(),
            expires_in: 3599,
        })
    }

    fn token_fragment(state: &str) -> String {
        format!("#access_token=tok-1&token_type=Bearer&expires_in=3599&state={state}")
    }

    fn replay(path: &str) -> Continuation {
        Continuation::Replay(ApiRequest::new(ApiCall::ListTasks, HttpMethod::Get, path))
    }

    #[tokio::test]
    async fn test_popup_sign_in() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        assert_eq!(f.manager.state(), AuthState::AwaitingInitialGrant);

        let (target, _) = f.launcher.last().unwrap();
        assert_eq!(target, LaunchTarget::Popup);
        let state = f.launcher.last_state().unwrap();

        let redemption = f
            .manager
            .redeem_token(&token_fragment(&state), true, &recorder())
            .await
            .unwrap();

        assert!(matches!(redemption, Redemption::SignedIn));
        assert_eq!(f.manager.state(), AuthState::Authenticated);
        assert_eq!(f.manager.access_token().unwrap().as_deref(), Some("tok-1"));
        assert!(f.manager.is_logged_in().unwrap());
        assert!(!f.manager.is_token_expired().unwrap());
        assert_eq!(*f.introspections.lock(), vec!["tok-1".to_string()]);

        let expires_at = f.manager.token_expires_at().unwrap().unwrap();
        let remaining = expires_at - Utc::now();
        assert!(remaining > Duration::seconds(3590) && remaining <= Duration::seconds(3599));
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        let fragment = token_fragment(&f.launcher.last_state().unwrap());

        f.manager
            .redeem_token(&fragment, true, &recorder())
            .await
            .unwrap();

        let replayed = f.manager.redeem_token(&fragment, true, &recorder()).await;
        assert!(matches!(replayed, Err(AuthError::StateMismatch)));
    }

    #[tokio::test]
    async fn test_mismatched_state_consumes_attempt() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        let state = CsrfState::parse(&f.launcher.last_state().unwrap()).unwrap();

        let forged = format!("{}.forged-nonce", state.flow_id());
        let result = f
            .manager
            .redeem_token(&token_fragment(&forged), true, &recorder())
            .await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));

        // The genuine redirect can no longer be redeemed either
        let result = f
            .manager
            .redeem_token(&token_fragment(state.as_str()), true, &recorder())
            .await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));
        assert!(f.introspections.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_state_is_rejected() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();

        let result = f
            .manager
            .redeem_token("#access_token=tok-1&expires_in=3599", true, &recorder())
            .await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));
    }

    #[tokio::test]
    async fn test_provider_error() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        let state = f.launcher.last_state().unwrap();

        let result = f
            .manager
            .redeem_token(
                &format!("#error=access_denied&state={state}"),
                true,
                &recorder(),
            )
            .await;

        assert!(matches!(result, Err(AuthError::ProviderError(ref e)) if e == "access_denied"));
        assert!(f.manager.access_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_audience_mismatch() {
        let f = fixture_with(TokenInfo {
            aud: "someone-else".to_string(),
            scope: crate::config::TASKS_SCOPE.to_string(),
            expires_in: 3599,
        });
        f.manager.begin_authorization().unwrap();
        let state = f.launcher.last_state().unwrap();

        let result = f
            .manager
            .redeem_token(&token_fragment(&state), true, &recorder())
            .await;

        assert!(matches!(result, Err(AuthError::AudienceMismatch { .. })));
        assert!(f.manager.access_token().unwrap().is_none());
        assert!(!f.manager.is_logged_in().unwrap());
    }

    #[tokio::test]
    async fn test_scope_mismatch_persists_nothing() {
        // A broader grant still fails: the match is exact, not a subset check
        let f = fixture_with(TokenInfo {
            aud: CLIENT_ID.to_string(),
            scope: format!("{} email", crate::config::TASKS_SCOPE),
            expires_in: 3599,
        });
        f.manager.begin_authorization().unwrap();
        let state = f.launcher.last_state().unwrap();

        let result = f
            .manager
            .redeem_token(&token_fragment(&state), true, &recorder())
            .await;

        assert!(matches!(result, Err(AuthError::ScopeMismatch { .. })));
        assert!(f.manager.access_token().unwrap().is_none());
        assert!(f.manager.token_expires_at().unwrap().is_none());
        assert_eq!(f.manager.state(), AuthState::AwaitingInitialGrant);
    }

    #[tokio::test]
    async fn test_refresh_drains_queue_in_order() {
        for queued in [0usize, 1, 3] {
            let f = fixture();
            f.db
                .set(StorageScope::Local, keys::LOGGED_IN, keys::LOGGED_IN)
                .unwrap();

            let continuations: Vec<Continuation> = (0..queued)
                .map(|i| replay(&format!("lists/l{i}/tasks")))
                .collect();

            if queued == 0 {
                f.manager
                    .begin_refresh(Continuation::ShowView { route: Route::Main })
                    .unwrap();
                // Emptied by an earlier drain in a real run
                f.manager.pending.lock().clear();
            }
            for c in &continuations {
                f.manager.begin_refresh(c.clone()).unwrap();
            }
            assert_eq!(f.manager.pending_len(), queued);

            let (target, _) = f.launcher.last().unwrap();
            assert_eq!(target, LaunchTarget::RefreshFrame);
            let state = f.launcher.last_state().unwrap();

            let runner = recorder();
            let redemption = f
                .manager
                .redeem_token(&token_fragment(&state), false, &runner)
                .await
                .unwrap();

            match redemption {
                Redemption::Refreshed(outcomes) => {
                    assert_eq!(outcomes, (1..=queued).collect::<Vec<_>>())
                }
                Redemption::SignedIn => panic!("Expected Refreshed"),
            }
            assert_eq!(*runner.ran.lock(), continuations);
            assert_eq!(f.manager.pending_len(), 0);
            assert_eq!(f.manager.state(), AuthState::Authenticated);
        }
    }

    #[tokio::test]
    async fn test_overlapping_flows_both_validate() {
        let f = fixture();
        f.manager.begin_refresh(replay("lists/a/tasks")).unwrap();
        let first = f.launcher.last_state().unwrap();
        f.manager.begin_refresh(replay("lists/b/tasks")).unwrap();
        let second = f.launcher.last_state().unwrap();
        assert_ne!(first, second);

        // The first redirect still validates after a second attempt started
        let runner = recorder();
        f.manager
            .redeem_token(&token_fragment(&first), false, &runner)
            .await
            .unwrap();
        assert_eq!(runner.ran.lock().len(), 2);

        let result = f
            .manager
            .redeem_token(&token_fragment(&second), false, &recorder())
            .await
            .unwrap();
        assert!(matches!(result, Redemption::Refreshed(ref v) if v.is_empty()));
    }

    #[test]
    fn test_expiry_boundary() {
        let f = fixture();
        assert!(f.manager.is_token_expired().unwrap());

        let expires_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        f.db
            .set(
                StorageScope::Session,
                keys::TOKEN_EXPIRATION,
                &expires_at.timestamp_millis().to_string(),
            )
            .unwrap();

        assert!(!f.manager.is_token_expired_at(expires_at).unwrap());
        assert!(f
            .manager
            .is_token_expired_at(expires_at + Duration::milliseconds(1))
            .unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        let state = f.launcher.last_state().unwrap();
        f.manager
            .redeem_token(&token_fragment(&state), true, &recorder())
            .await
            .unwrap();
        f.db
            .set(StorageScope::Local, keys::SELECTED_TASK_LIST, "list-9")
            .unwrap();
        f.manager.begin_refresh(replay("lists/x/tasks")).unwrap();

        f.manager.logout().unwrap();

        assert_eq!(f.manager.state(), AuthState::Unauthenticated);
        assert!(f.manager.access_token().unwrap().is_none());
        assert!(f.manager.token_expires_at().unwrap().is_none());
        assert!(!f.manager.is_logged_in().unwrap());
        assert_eq!(
            f.db.get(StorageScope::Local, keys::SELECTED_TASK_LIST).unwrap(),
            None
        );
        assert_eq!(f.manager.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_redirect_after_logout_is_not_trusted() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        let state = f.launcher.last_state().unwrap();
        f.manager.logout().unwrap();

        let result = f
            .manager
            .redeem_token(&token_fragment(&state), true, &recorder())
            .await;

        assert!(matches!(result, Err(AuthError::InvalidTransition { .. })));
        assert!(f.manager.access_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_rejected() {
        for expires_in in [100_000_000_000_000_000, u64::MAX] {
            let f = fixture_with(TokenInfo {
                aud: CLIENT_ID.to_string(),
                scope: crate::config::TASKS_SCOPE.to_string(),
                expires_in,
            });
            f.manager.begin_authorization().unwrap();
            let state = f.launcher.last_state().unwrap();

            let result = f
                .manager
                .redeem_token(&token_fragment(&state), true, &recorder())
                .await;

            assert!(matches!(result, Err(AuthError::Introspection(_))));
            assert_eq!(f.manager.state(), AuthState::AwaitingInitialGrant);
            assert!(f.manager.access_token().unwrap().is_none());
            assert!(!f.manager.is_logged_in().unwrap());
        }
    }

    #[tokio::test]
    async fn test_abandoned_states_are_swept() {
        let f = fixture();
        f.manager.begin_authorization().unwrap();
        let abandoned = CsrfState::parse(&f.launcher.last_state().unwrap()).unwrap();

        // No state in the redirect: nothing identifies the attempt
        let result = f
            .manager
            .redeem_token("#access_token=tok-1", true, &recorder())
            .await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));
        assert!(f
            .db
            .contains(StorageScope::Session, &abandoned.storage_key())
            .unwrap());

        f.db.with_connection(|conn| {
            conn.execute(
                "UPDATE session_storage SET updated_at = '2000-01-01T00:00:00.000Z' WHERE key = ?1",
                [abandoned.storage_key()],
            )?;
            Ok(())
        })
        .unwrap();

        f.manager.begin_authorization().unwrap();
        let fresh = CsrfState::parse(&f.launcher.last_state().unwrap()).unwrap();

        assert!(!f
            .db
            .contains(StorageScope::Session, &abandoned.storage_key())
            .unwrap());
        assert!(f
            .db
            .contains(StorageScope::Session, &fresh.storage_key())
            .unwrap());
    }

    /// Passes introspection, then breaks the session table
    struct FailingStoreIntrospector {
        db: Database,
    }

    #[async_trait]
    impl TokenIntrospector for FailingStoreIntrospector {
        async fn introspect(&self, _access_token: &str) -> Result<TokenInfo> {
            self.db.with_connection(|conn| {
                conn.execute_batch("DROP TABLE session_storage")?;
                Ok(())
            })?;

            Ok(TokenInfo {
                aud: CLIENT_ID.to_string(),
                scope: crate::config::TASKS_SCOPE.to_string(),
                expires_in: 3599,
            })
        }
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_previous_state() {
        let db = Database::open_in_memory().unwrap();
        let launcher = RecordingLauncher::new();
        let config = AuthConfig::new(
            CLIENT_ID,
            Url::parse("http://localhost:8080/oauth2callback.html").unwrap(),
        )
        .unwrap();
        let manager = SessionManager::new(
            config,
            db.clone(),
            Arc::new(launcher.clone()),
            Arc::new(FailingStoreIntrospector { db: db.clone() }),
        );

        manager.begin_authorization().unwrap();
        let state = launcher.last_state().unwrap();

        let result = manager
            .redeem_token(&token_fragment(&state), true, &recorder())
            .await;

        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert_eq!(manager.state(), AuthState::AwaitingInitialGrant);
        assert!(!manager.is_logged_in().unwrap());
    }
}
