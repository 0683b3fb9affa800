//! Typed task-service operations

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use gotasks_session::{ApiCall, ApiRequest, HttpMethod};

use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::models::{Task, TaskDraft, TaskListName, TaskLists, TaskPage, TaskPatch};
use crate::Result;

/// Task list used until the user picks another one
pub const DEFAULT_TASK_LIST: &str = "@default";

const TASK_LIST_FIELDS: &str = "items(id,title)";
const TASK_PAGE_FIELDS: &str = "nextPageToken,items(id,etag,title,notes,due,completed)";

pub struct TaskClient {
    gateway: ApiGateway,
}

impl TaskClient {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let value = self.gateway.invoke(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Task lists of the signed-in user. Pagination is not followed.
    pub async fn list_task_lists(&self) -> Result<TaskLists> {
        let request = ApiRequest::new(ApiCall::ListTaskLists, HttpMethod::Get, "users/@me/lists")
            .query("fields", TASK_LIST_FIELDS);

        self.fetch(request).await
    }

    pub async fn get_task_list_name(&self, task_list: &str) -> Result<TaskListName> {
        let request = ApiRequest::new(
            ApiCall::GetTaskListName,
            HttpMethod::Get,
            format!("users/@me/lists/{task_list}"),
        )
        .query("fields", "title");

        self.fetch(request).await
    }

    /// One page of tasks; `page_token` continues a previous page
    pub async fn list_tasks(&self, task_list: &str, page_token: Option<&str>) -> Result<TaskPage> {
        let mut request = ApiRequest::new(
            ApiCall::ListTasks,
            HttpMethod::Get,
            format!("lists/{task_list}/tasks"),
        )
        .query("fields", TASK_PAGE_FIELDS);

        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }

        self.fetch(request).await
    }

    /// Every task in the list, following page tokens
    pub async fn list_all_tasks(&self, task_list: &str) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_tasks(task_list, page_token.as_deref()).await?;
            tasks.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(task_list = %task_list, count = tasks.len(), "Loaded tasks");

        Ok(tasks)
    }

    pub async fn get_task(&self, task_list: &str, task: &str) -> Result<Task> {
        let request = ApiRequest::new(
            ApiCall::GetTask,
            HttpMethod::Get,
            format!("lists/{task_list}/tasks/{task}"),
        );

        self.fetch(request).await
    }

    pub async fn create_task(&self, task_list: &str, draft: &TaskDraft) -> Result<Task> {
        let request = ApiRequest::new(
            ApiCall::CreateTask,
            HttpMethod::Post,
            format!("lists/{task_list}/tasks"),
        )
        .json(serde_json::to_value(draft)?);

        self.fetch(request).await
    }

    /// Rejected by the service when `etag` is stale
    pub async fn update_task(
        &self,
        task_list: &str,
        id: &str,
        etag: &str,
        patch: &TaskPatch,
    ) -> Result<Task> {
        let request = ApiRequest::new(
            ApiCall::UpdateTask,
            HttpMethod::Patch,
            format!("lists/{task_list}/tasks/{id}"),
        )
        .if_match(etag)
        .json(serde_json::to_value(patch)?);

        self.fetch(request).await
    }

    pub async fn update_completed(
        &self,
        task_list: &str,
        id: &str,
        etag: &str,
        completed: bool,
    ) -> Result<Task> {
        let body = if completed {
            json!({ "status": "completed" })
        } else {
            json!({ "completed": null, "status": "needsAction" })
        };

        let request = ApiRequest::new(
            ApiCall::UpdateCompleted,
            HttpMethod::Patch,
            format!("lists/{task_list}/tasks/{id}"),
        )
        .if_match(etag)
        .json(body);

        self.fetch(request).await
    }

    /// Any failure other than 401 is reported as `ClearFailed`
    pub async fn clear_completed_tasks(&self, task_list: &str) -> Result<()> {
        let request = ApiRequest::new(
            ApiCall::ClearCompletedTasks,
            HttpMethod::Post,
            format!("lists/{task_list}/clear"),
        );

        self.clear(request).await.map(|_| ())
    }

    async fn clear(&self, request: ApiRequest) -> Result<Value> {
        match self.gateway.invoke(request).await {
            Ok(value) => Ok(value),
            Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::warn!(error = %e, "Clearing completed tasks failed");
                Err(ApiError::ClearFailed)
            }
        }
    }

    /// Re-issue a request parked behind a token refresh
    pub async fn replay(&self, request: ApiRequest) -> Result<Value> {
        tracing::debug!(call = ?request.call, path = %request.path, "Replaying request");

        match request.call {
            ApiCall::ClearCompletedTasks => self.clear(request).await,
            _ => self.gateway.invoke(request).await,
        }
    }
}

impl Clone for TaskClient {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}
