//! Application state container
//!
//! Owns the storage, the session, the task client and the router, and
//! turns routes into view models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join;
use serde_json::Value;
use std::sync::Arc;

use gotasks_navigation::{Route, Router};
use gotasks_session::{
    AuthorizationLauncher, Continuation, ContinuationRunner, HttpIntrospector, Redemption,
    SessionManager, TokenIntrospector,
};
use gotasks_storage::Database;
use gotasks_tasks::{ApiGateway, Task, TaskClient};

use crate::config::Config;
use crate::message::{MessageSource, RedirectMessage};
use crate::selection::TaskListSelection;
use crate::views::{MainView, SettingView, TaskDetailView, TaskForm, View};
use crate::Result;

/// What the UI should show right after launch
#[derive(Debug, Clone, PartialEq)]
pub enum Startup {
    /// First use or logged out
    SignInRequired,
    /// The token expired; the current route is shown once it is renewed
    Refreshing,
    Ready(View),
}

/// Result of a continuation resumed after a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum Resumed {
    /// Body of a replayed task-service call
    Response(Value),
    View(View),
}

#[derive(Debug)]
pub enum MessageOutcome {
    /// Foreign origin or unrecognized sender
    Ignored,
    SignedIn(View),
    /// One entry per resumed continuation, in the order they were parked
    Refreshed(Vec<Result<Resumed>>),
}

pub struct App {
    config: Config,
    /// Only messages from this origin are accepted
    origin: String,
    db: Database,
    session: SessionManager,
    tasks: TaskClient,
    router: Router,
    selection: TaskListSelection,
    launcher: Arc<dyn AuthorizationLauncher>,
}

impl App {
    /// Open the database named in `config` and wire up the components
    pub fn new(config: Config, launcher: Arc<dyn AuthorizationLauncher>) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        let introspector = HttpIntrospector::new(url::Url::parse(&config.introspection_endpoint)?)?;

        Self::with_parts(config, db, launcher, Arc::new(introspector))
    }

    pub fn with_parts(
        config: Config,
        db: Database,
        launcher: Arc<dyn AuthorizationLauncher>,
        introspector: Arc<dyn TokenIntrospector>,
    ) -> Result<Self> {
        let origin = config.origin()?;
        let session = SessionManager::new(
            config.auth_config()?,
            db.clone(),
            Arc::clone(&launcher),
            introspector,
        );
        let tasks = TaskClient::new(ApiGateway::new(config.tasks_api_url()?, session.clone())?);

        Ok(Self {
            config,
            origin,
            selection: TaskListSelection::new(db.clone()),
            db,
            session,
            tasks,
            router: Router::new(),
            launcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn selected_task_list(&self) -> Result<String> {
        self.selection.selected()
    }

    pub async fn startup(&self) -> Result<Startup> {
        self.startup_at(Utc::now()).await
    }

    /// Decide the first screen as of `now`
    pub async fn startup_at(&self, now: DateTime<Utc>) -> Result<Startup> {
        if !self.session.is_logged_in()? {
            tracing::info!("Not signed in");
            return Ok(Startup::SignInRequired);
        }

        let route = self.router.current();
        if self.session.is_token_expired_at(now)? {
            tracing::info!(route = %route, "Token expired, refreshing before showing view");
            self.session
                .begin_refresh(Continuation::ShowView { route })?;
            return Ok(Startup::Refreshing);
        }

        Ok(Startup::Ready(self.render(&route).await?))
    }

    /// Open the interactive sign-in popup
    pub fn sign_in(&self) -> Result<()> {
        self.session.begin_authorization()?;
        Ok(())
    }

    /// Handle a redirect posted back by the popup or the refresh frame
    pub async fn receive_message(&self, message: RedirectMessage) -> Result<MessageOutcome> {
        if message.origin != self.origin {
            tracing::debug!(origin = %message.origin, "Ignoring message from foreign origin");
            return Ok(MessageOutcome::Ignored);
        }

        match message.source {
            MessageSource::Unknown => {
                tracing::debug!("Ignoring message from unknown sender");
                Ok(MessageOutcome::Ignored)
            }
            MessageSource::Popup => {
                self.session
                    .redeem_token(&message.payload, true, self)
                    .await
                    .inspect_err(|e| tracing::warn!(error = %e, "Sign-in failed"))?;

                let view = self.navigate(Route::Main).await?;
                Ok(MessageOutcome::SignedIn(view))
            }
            MessageSource::RefreshFrame => {
                self.launcher.reset_refresh_frame();

                let redemption = self
                    .session
                    .redeem_token(&message.payload, false, self)
                    .await
                    .inspect_err(|e| tracing::warn!(error = %e, "Token refresh failed"))?;

                match redemption {
                    Redemption::Refreshed(outcomes) => Ok(MessageOutcome::Refreshed(outcomes)),
                    Redemption::SignedIn => Ok(MessageOutcome::Refreshed(Vec::new())),
                }
            }
        }
    }

    /// Move to `route` and render it
    pub async fn navigate(&self, route: Route) -> Result<View> {
        let route = self.router.navigate(route);
        self.render(&route).await
    }

    /// Navigate by URL fragment; unknown fragments are ignored
    pub async fn navigate_hash(&self, hash: &str) -> Result<Option<View>> {
        match self.router.navigate_hash(hash) {
            Some(route) => Ok(Some(self.render(&route).await?)),
            None => Ok(None),
        }
    }

    /// Re-render the current route
    pub async fn show_current(&self) -> Result<View> {
        let route = self.router.current();
        self.render(&route).await
    }

    async fn render(&self, route: &Route) -> Result<View> {
        let view = match route {
            Route::Main => View::Main(self.main_view().await?),
            Route::SignIn => View::SignIn,
            Route::TaskDetail(task_id) => {
                View::TaskDetail(self.task_detail_view(task_id.as_deref()).await?)
            }
            Route::Setting => View::Setting(self.setting_view().await?),
        };

        tracing::debug!(view = view.name(), "Rendered view");
        Ok(view)
    }

    pub async fn main_view(&self) -> Result<MainView> {
        let task_list = self.selection.selected()?;
        // Both calls run to completion so each 401 parks its own replay
        let (name, tasks) = join(
            self.tasks.get_task_list_name(&task_list),
            self.tasks.list_all_tasks(&task_list),
        )
        .await;

        Ok(MainView::new(name?.title, task_list, &tasks?))
    }

    pub async fn task_detail_view(&self, task_id: Option<&str>) -> Result<TaskDetailView> {
        let form = match task_id {
            Some(id) => {
                let task_list = self.selection.selected()?;
                TaskForm::from_task(&self.tasks.get_task(&task_list, id).await?)
            }
            None => TaskForm::default(),
        };

        Ok(TaskDetailView {
            task_id: task_id.map(str::to_string),
            form,
        })
    }

    pub async fn setting_view(&self) -> Result<SettingView> {
        let selected = self.selection.selected()?;
        let lists = self.tasks.list_task_lists().await?;
        Ok(SettingView::new(&lists.items, &selected))
    }

    /// Update `task_id` with the form's etag, or create a task when `None`.
    /// Shows the task list afterwards.
    pub async fn save_task(&self, task_id: Option<&str>, form: &TaskForm) -> Result<View> {
        let task_list = self.selection.selected()?;

        let saved: Task = match task_id {
            Some(id) => {
                self.tasks
                    .update_task(&task_list, id, &form.etag, &form.to_patch()?)
                    .await?
            }
            None => self.tasks.create_task(&task_list, &form.to_draft()?).await?,
        };

        tracing::info!(task_id = %saved.id, created = task_id.is_none(), "Task saved");
        self.navigate(Route::Main).await
    }

    /// Tick or untick a task; returns its new etag
    pub async fn set_completed(&self, task_id: &str, etag: &str, checked: bool) -> Result<String> {
        let task_list = self.selection.selected()?;
        let task = self
            .tasks
            .update_completed(&task_list, task_id, etag, checked)
            .await?;
        Ok(task.etag)
    }

    /// Hide completed tasks of the selected list, then show the list
    pub async fn clear_completed(&self) -> Result<View> {
        let task_list = self.selection.selected()?;
        self.tasks.clear_completed_tasks(&task_list).await?;
        self.navigate(Route::Main).await
    }

    pub fn select_task_list(&self, task_list: &str) -> Result<()> {
        self.selection.select(task_list)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()?;
        self.router.navigate(Route::SignIn);
        Ok(())
    }
}

#[async_trait]
impl ContinuationRunner for App {
    type Outcome = Result<Resumed>;

    async fn run(&self, continuation: Continuation) -> Self::Outcome {
        match continuation {
            Continuation::Replay(request) => {
                Ok(Resumed::Response(self.tasks.replay(request).await?))
            }
            Continuation::ShowView { route } => Ok(Resumed::View(self.navigate(route).await?)),
        }
    }
}
