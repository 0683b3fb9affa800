//! gotasks Task Service Client
//!
//! Every call goes through [`ApiGateway::invoke`], which attaches the
//! bearer token and turns a 401 into a queued replay behind a silent token
//! refresh. The first call still fails with [`ApiError::Unauthorized`];
//! the replay is a separate invocation.

mod client;
mod error;
mod gateway;
mod models;

pub use client::{TaskClient, DEFAULT_TASK_LIST};
pub use error::ApiError;
pub use gateway::{ApiGateway, TASKS_API_BASE};
pub use models::{Task, TaskDraft, TaskList, TaskListName, TaskLists, TaskPage, TaskPatch};

pub type Result<T> = std::result::Result<T, ApiError>;
