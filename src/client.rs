//! Caller-side client for a running recall gateway.
//!
//! Connecting creates the project; a name the caller already owns is
//! reported as [`StrandError::Duplicate`]. Gateway statuses map back onto
//! [`StrandError`] so callers handle remote and in-process engines alike.

use crate::error::{GenerationError, Result, StrandError, ValidationError};
use crate::llm::http_client::build_http_client;
use crate::llm::scrub::sanitize_api_error;
use crate::recall::ContextPackage;
use crate::store::ChatPair;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const CLIENT_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct ProjectTarget<'a> {
    api_key: &'a str,
    project_name: &'a str,
}

#[derive(Serialize)]
struct RecallRequest<'a> {
    api_key: &'a str,
    openai_key: &'a str,
    project_name: &'a str,
    chat_pair: &'a ChatPair,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// One caller's handle on one project of a remote gateway.
pub struct StrandkeepClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    openai_key: String,
    project_name: String,
}

impl StrandkeepClient {
    /// Create `project_name` on the gateway at `base_url` and bind to it.
    pub async fn connect(
        base_url: &str,
        api_key: &str,
        openai_key: &str,
        project_name: &str,
    ) -> Result<Self> {
        let client = Self {
            http: build_http_client(CLIENT_TIMEOUT_SECS),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            openai_key: openai_key.to_string(),
            project_name: project_name.to_string(),
        };

        let response = client
            .http
            .post(format!("{}/project/create", client.base_url))
            .json(&ProjectTarget {
                api_key,
                project_name,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            let detail = detail(response).await;
            if status == StatusCode::BAD_REQUEST
                && detail.to_lowercase().contains("already exists")
            {
                return Err(StrandError::Duplicate);
            }
            return Err(error_for(status, detail));
        }

        tracing::info!(project = %client.project_name, "connected to recall gateway");
        Ok(client)
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Context for `chat_pair`; the gateway consolidates the turn afterwards.
    pub async fn recall(&self, chat_pair: &ChatPair) -> Result<ContextPackage> {
        let response = self
            .http
            .post(format!("{}/recall", self.base_url))
            .json(&RecallRequest {
                api_key: &self.api_key,
                openai_key: &self.openai_key,
                project_name: &self.project_name,
                chat_pair,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(error_for(status, detail(response).await));
        }

        response
            .json()
            .await
            .map_err(|error| StrandError::Unavailable(format!("invalid recall response: {error}")))
    }
}

fn transport_error(error: reqwest::Error) -> StrandError {
    StrandError::Unavailable(sanitize_api_error(&error.to_string()))
}

/// `detail` of an error body, or the raw body when it is not one.
async fn detail(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .unwrap_or(body);
    sanitize_api_error(&detail)
}

fn error_for(status: StatusCode, detail: String) -> StrandError {
    match status {
        StatusCode::BAD_REQUEST => ValidationError::Rejected(detail).into(),
        StatusCode::NOT_FOUND => StrandError::project_not_found(),
        StatusCode::BAD_GATEWAY => GenerationError::Completion(detail).into(),
        other => StrandError::Unavailable(format!("{} {detail}", other.as_u16())),
    }
}
