//! Router
//!
//! Tracks the current view. Navigating to the route that is already
//! current still counts as a navigation so the view is rendered again.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::route::Route;

pub struct Router {
    current: Arc<RwLock<Route>>,
    navigations: Arc<RwLock<u64>>,
}

impl Router {
    pub fn new() -> Self {
        Self::starting_at(Route::Main)
    }

    pub fn starting_at(route: Route) -> Self {
        Self {
            current: Arc::new(RwLock::new(route)),
            navigations: Arc::new(RwLock::new(0)),
        }
    }

    pub fn current(&self) -> Route {
        self.current.read().clone()
    }

    /// Move to `route` and return it for rendering
    pub fn navigate(&self, route: Route) -> Route {
        let previous = std::mem::replace(&mut *self.current.write(), route.clone());
        *self.navigations.write() += 1;

        tracing::debug!(
            from = %previous,
            to = %route,
            reload = previous == route,
            "Navigated"
        );

        route
    }

    /// Navigate by fragment. Unknown fragments leave the current view untouched.
    pub fn navigate_hash(&self, hash: &str) -> Option<Route> {
        match Route::parse(hash) {
            Some(route) => Some(self.navigate(route)),
            None => {
                tracing::debug!(hash = %hash, "Ignoring unknown route");
                None
            }
        }
    }

    /// Number of navigations performed, including reloads of the same view
    pub fn navigation_count(&self) -> u64 {
        *self.navigations.read()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Router {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            navigations: Arc::clone(&self.navigations),
        }
    }
}
