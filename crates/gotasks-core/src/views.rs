//! Render-ready view models

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use gotasks_tasks::{Task, TaskDraft, TaskList, TaskPatch};

use crate::error::CoreError;
use crate::Result;

/// Heading for tasks without a due date
pub const NO_DUE_DATE: &str = "No due date";

const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum View {
    Main(MainView),
    TaskDetail(TaskDetailView),
    Setting(SettingView),
    SignIn,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Main(_) => "main",
            View::TaskDetail(_) => "taskDetail",
            View::Setting(_) => "setting",
            View::SignIn => "signin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub etag: String,
    pub completed: bool,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            etag: task.etag.clone(),
            completed: task.is_completed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueGroup {
    pub heading: String,
    pub tasks: Vec<TaskSummary>,
}

/// Tasks of the selected list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainView {
    /// Name of the task list
    pub title: String,
    pub task_list: String,
    pub groups: Vec<DueGroup>,
    pub is_empty: bool,
}

impl MainView {
    pub fn new(title: String, task_list: String, tasks: &[Task]) -> Self {
        Self {
            title,
            task_list,
            groups: group_by_due(tasks),
            is_empty: tasks.is_empty(),
        }
    }

    pub fn task_count(&self) -> usize {
        self.groups.iter().map(|g| g.tasks.len()).sum()
    }
}

/// Group tasks by due date, earliest first, undated tasks last.
///
/// Within a group tasks keep the order the service returned.
pub fn group_by_due(tasks: &[Task]) -> Vec<DueGroup> {
    let mut dated: BTreeMap<String, Vec<TaskSummary>> = BTreeMap::new();
    let mut undated = Vec::new();

    for task in tasks {
        match task.due.as_deref().map(due_to_form_date) {
            Some(key) if !key.is_empty() => dated.entry(key).or_default().push(task.into()),
            _ => undated.push(task.into()),
        }
    }

    let mut groups: Vec<DueGroup> = dated
        .into_iter()
        .map(|(heading, tasks)| DueGroup { heading, tasks })
        .collect();

    if !undated.is_empty() {
        groups.push(DueGroup {
            heading: NO_DUE_DATE.to_string(),
            tasks: undated,
        });
    }

    groups
}

/// `2024-05-01T00:00:00.000Z` → `2024-05-01`
fn due_to_form_date(due: &str) -> String {
    match DateTime::parse_from_rfc3339(due) {
        Ok(ts) => ts.date_naive().format(FORM_DATE_FORMAT).to_string(),
        Err(_) => due.split('T').next().unwrap_or_default().to_string(),
    }
}

/// Editable fields of a task, as entered in a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskForm {
    pub title: String,
    /// `YYYY-MM-DD` or empty
    pub due_date: String,
    pub notes: String,
    /// Empty for a task that does not exist yet
    pub etag: String,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            due_date: task.due.as_deref().map(due_to_form_date).unwrap_or_default(),
            notes: task.notes.clone().unwrap_or_default(),
            etag: task.etag.clone(),
        }
    }

    /// Due timestamp at midnight UTC, `None` when the date is blank
    pub fn due_timestamp(&self) -> Result<Option<String>> {
        let date = self.due_date.trim();
        if date.is_empty() {
            return Ok(None);
        }

        let parsed = NaiveDate::parse_from_str(date, FORM_DATE_FORMAT)
            .map_err(|_| CoreError::InvalidDueDate(date.to_string()))?;
        Ok(Some(format!(
            "{}T00:00:00.000Z",
            parsed.format(FORM_DATE_FORMAT)
        )))
    }

    /// Body for a new task; blank fields are left out
    pub fn to_draft(&self) -> Result<TaskDraft> {
        Ok(TaskDraft {
            title: non_empty(&self.title),
            due: self.due_timestamp()?,
            notes: non_empty(&self.notes),
        })
    }

    /// Body for an edit; blank fields clear the stored value
    pub fn to_patch(&self) -> Result<TaskPatch> {
        Ok(TaskPatch {
            title: non_empty(&self.title),
            due: self.due_timestamp()?,
            notes: non_empty(&self.notes),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetailView {
    /// `None` when adding a task
    pub task_id: Option<String>,
    pub form: TaskForm,
}

impl TaskDetailView {
    pub fn is_new(&self) -> bool {
        self.task_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingView {
    pub lists: Vec<TaskListOption>,
}

impl SettingView {
    pub fn new(lists: &[TaskList], selected: &str) -> Self {
        Self {
            lists: lists
                .iter()
                .map(|l| TaskListOption {
                    id: l.id.clone(),
                    title: l.title.clone(),
                    selected: l.id == selected,
                })
                .collect(),
        }
    }
}
