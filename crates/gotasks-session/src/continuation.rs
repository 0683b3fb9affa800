//! Replayable work parked behind a token refresh

use async_trait::async_trait;
use gotasks_navigation::Route;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which task-service operation a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiCall {
    ListTaskLists,
    GetTaskListName,
    ListTasks,
    GetTask,
    CreateTask,
    UpdateTask,
    UpdateCompleted,
    ClearCompletedTasks,
}

/// Everything needed to issue a task-service call again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub call: ApiCall,
    pub method: HttpMethod,
    /// Path relative to the service base URL, e.g. `lists/@default/tasks`
    pub path: String,
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Etag for `If-Match`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_match: Option<String>,
}

impl ApiRequest {
    pub fn new(call: ApiCall, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            call,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            if_match: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Continuation {
    /// Re-issue a task-service call
    Replay(ApiRequest),
    /// Render a view that was waiting for a valid token
    ShowView { route: Route },
}

/// Runs drained continuations once a refreshed token is stored
#[async_trait]
pub trait ContinuationRunner: Send + Sync {
    type Outcome: Send;

    async fn run(&self, continuation: Continuation) -> Self::Outcome;
}
