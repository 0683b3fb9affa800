//! API Gateway
//!
//! Uniform handling of task-service responses:
//! - 401 → queue a replay behind a token refresh, fail with `Unauthorized`
//! - other failures → `Api { code, message }` from the error body
//! - 204 or empty body → empty JSON object
//! - otherwise the parsed body

use reqwest::header::IF_MATCH;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use gotasks_session::{ApiRequest, Continuation, HttpMethod, SessionManager};

use crate::error::ApiError;
use crate::Result;

pub const TASKS_API_BASE: &str = "https://www.googleapis.com/tasks/v1";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: Option<String>,
}

pub struct ApiGateway {
    client: reqwest::Client,
    base_url: Url,
    session: SessionManager,
}

impl ApiGateway {
    pub fn new(base_url: Url, session: SessionManager) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn endpoint(&self, request: &ApiRequest) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, request.path))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Issue `request` with the current bearer token
    pub async fn invoke(&self, request: ApiRequest) -> Result<Value> {
        let url = self.endpoint(&request)?;
        let token = self.session.access_token()?.unwrap_or_default();

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
        };

        let mut builder = self.client.request(method, url).bearer_auth(&token);
        if let Some(etag) = &request.if_match {
            builder = builder.header(IF_MATCH, etag);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::info!(
                call = ?request.call,
                path = %request.path,
                "Access token rejected, queueing replay"
            );
            self.session.begin_refresh(Continuation::Replay(request))?;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (
                    envelope.error.code.unwrap_or(status.as_u16()),
                    envelope
                        .error
                        .message
                        .unwrap_or_else(|| status.to_string()),
                ),
                Err(_) => (status.as_u16(), status.to_string()),
            };

            tracing::warn!(
                call = ?request.call,
                code,
                message = %message,
                "Task service call failed"
            );
            return Err(ApiError::Api { code, message });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Default::default()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl Clone for ApiGateway {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session: self.session.clone(),
        }
    }
}
