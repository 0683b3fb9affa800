//! Remembers which task list the user is looking at

use gotasks_session::keys;
use gotasks_storage::{Database, KeyValueStore, StorageScope};
use gotasks_tasks::DEFAULT_TASK_LIST;

use crate::Result;

pub struct TaskListSelection {
    db: Database,
}

impl TaskListSelection {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Selected list id, `@default` when nothing was picked
    pub fn selected(&self) -> Result<String> {
        Ok(self
            .db
            .get(StorageScope::Local, keys::SELECTED_TASK_LIST)?
            .unwrap_or_else(|| DEFAULT_TASK_LIST.to_string()))
    }

    pub fn select(&self, task_list: &str) -> Result<()> {
        self.db
            .set(StorageScope::Local, keys::SELECTED_TASK_LIST, task_list)?;
        tracing::debug!(task_list = %task_list, "Task list selected");
        Ok(())
    }
}

impl Clone for TaskListSelection {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}
