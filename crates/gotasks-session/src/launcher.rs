//! Where authorization requests are opened

use parking_lot::RwLock;
use std::sync::Arc;
use url::Url;

/// Opens authorization URLs on behalf of the session manager.
///
/// The popup is interactive and used for the first sign-in. The refresh
/// frame is hidden; with an existing grant the provider redirects straight
/// back without user interaction.
pub trait AuthorizationLauncher: Send + Sync {
    fn open_popup(&self, url: &Url);

    fn navigate_refresh_frame(&self, url: &Url);

    /// Point the refresh frame back at a blank page once its redirect arrived
    fn reset_refresh_frame(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Popup,
    RefreshFrame,
}

/// Records requested URLs without opening anything
pub struct RecordingLauncher {
    launches: Arc<RwLock<Vec<(LaunchTarget, Url)>>>,
    resets: Arc<RwLock<usize>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self {
            launches: Arc::new(RwLock::new(Vec::new())),
            resets: Arc::new(RwLock::new(0)),
        }
    }

    pub fn launches(&self) -> Vec<(LaunchTarget, Url)> {
        self.launches.read().clone()
    }

    pub fn last(&self) -> Option<(LaunchTarget, Url)> {
        self.launches.read().last().cloned()
    }

    /// `state` parameter of the most recent launch
    pub fn last_state(&self) -> Option<String> {
        let (_, url) = self.last()?;
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
    }

    pub fn reset_count(&self) -> usize {
        *self.resets.read()
    }
}

impl Default for RecordingLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingLauncher {
    fn clone(&self) -> Self {
        Self {
            launches: Arc::clone(&self.launches),
            resets: Arc::clone(&self.resets),
        }
    }
}

impl AuthorizationLauncher for RecordingLauncher {
    fn open_popup(&self, url: &Url) {
        self.launches
            .write()
            .push((LaunchTarget::Popup, url.clone()));
    }

    fn navigate_refresh_frame(&self, url: &Url) {
        self.launches
            .write()
            .push((LaunchTarget::RefreshFrame, url.clone()));
    }

    fn reset_refresh_frame(&self) {
        *self.resets.write() += 1;
    }
}
