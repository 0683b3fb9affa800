//! gotasks Core
//!
//! Application layer of the gotasks client: configuration, startup,
//! redirect message handling and view models over the session and task
//! crates.

mod app;
mod config;
mod error;
mod message;
mod selection;
mod views;

pub use app::{App, MessageOutcome, Resumed, Startup};
pub use config::{Config, CLIENT_ID_ENV};
pub use error::CoreError;
pub use message::{MessageSource, RedirectMessage};
pub use selection::TaskListSelection;
pub use views::{
    group_by_due, DueGroup, MainView, SettingView, TaskDetailView, TaskForm, TaskListOption,
    TaskSummary, View, NO_DUE_DATE,
};

// Re-export the building blocks
pub use gotasks_navigation::{NavigationError, Route, Router};
pub use gotasks_session::{
    ApiCall, ApiRequest, AuthError, AuthState, AuthorizationLauncher, Continuation,
    LaunchTarget, RecordingLauncher, SessionManager,
};
pub use gotasks_storage::{Database, StorageError};
pub use gotasks_tasks::{ApiError, Task, TaskClient, TaskList};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
