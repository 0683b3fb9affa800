//! Prints authorization URLs for the user to open

use parking_lot::RwLock;
use std::sync::Arc;
use url::Url;

use gotasks_core::{AuthorizationLauncher, LaunchTarget, MessageSource};

/// Remembers which kind of flow the last printed URL belongs to, so a
/// pasted redirect can be routed like a popup or refresh-frame message.
pub struct ConsoleLauncher {
    awaiting: Arc<RwLock<Option<LaunchTarget>>>,
}

impl ConsoleLauncher {
    pub fn new() -> Self {
        Self {
            awaiting: Arc::new(RwLock::new(None)),
        }
    }

    /// Sender to attribute the next pasted redirect to
    pub fn redirect_source(&self) -> MessageSource {
        match *self.awaiting.read() {
            Some(LaunchTarget::Popup) => MessageSource::Popup,
            Some(LaunchTarget::RefreshFrame) => MessageSource::RefreshFrame,
            None => MessageSource::Unknown,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting.read().is_some()
    }

    pub fn clear(&self) {
        *self.awaiting.write() = None;
    }

    fn launch(&self, target: LaunchTarget, url: &Url) {
        *self.awaiting.write() = Some(target);

        match target {
            LaunchTarget::Popup => println!("Sign in by opening:\n  {url}"),
            LaunchTarget::RefreshFrame => {
                println!("Session expired. Renew it by opening:\n  {url}")
            }
        }
        println!("Then paste the URL you were redirected to.");
    }
}

impl Clone for ConsoleLauncher {
    fn clone(&self) -> Self {
        Self {
            awaiting: Arc::clone(&self.awaiting),
        }
    }
}

impl AuthorizationLauncher for ConsoleLauncher {
    fn open_popup(&self, url: &Url) {
        self.launch(LaunchTarget::Popup, url);
    }

    fn navigate_refresh_frame(&self, url: &Url) {
        self.launch(LaunchTarget::RefreshFrame, url);
    }

    fn reset_refresh_frame(&self) {
        self.clear();
    }
}
