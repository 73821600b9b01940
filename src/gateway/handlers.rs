use super::AppState;
use crate::error::{StrandError, ValidationError};
use crate::store::ChatPair;
use axum::{
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

pub(super) const SERVICE_NAME: &str = "strandkeep";

/// Error body for every failed request: `{"detail": "..."}`.
pub(super) struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<StrandError> for ApiError {
    fn from(error: StrandError) -> Self {
        let status = match &error {
            StrandError::Validation(_) | StrandError::Duplicate => StatusCode::BAD_REQUEST,
            StrandError::NotFound(_) => StatusCode::NOT_FOUND,
            StrandError::Generation(_) | StrandError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            StrandError::Retrieval(_) | StrandError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = match &error {
            StrandError::Store(source) => {
                tracing::error!(error = %format!("{source:#}"), "document store failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        Self { status, detail }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"detail": self.detail}))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

#[derive(Deserialize)]
pub(super) struct ProjectTarget {
    api_key: String,
    project_name: String,
}

#[derive(Deserialize)]
pub(super) struct AddMemoryBody {
    api_key: String,
    project_name: String,
    memory_strand: String,
}

#[derive(Deserialize)]
pub(super) struct AddChatBody {
    api_key: String,
    project_name: String,
    user_message: String,
    assistant_message: String,
}

#[derive(Deserialize)]
pub(super) struct AddSummaryBody {
    api_key: String,
    project_name: String,
    summary: String,
}

#[derive(Deserialize)]
pub(super) struct RecentChatsQuery {
    api_key: String,
    project_name: String,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub(super) struct RecallBody {
    api_key: String,
    openai_key: String,
    project_name: String,
    chat_pair: ChatPair,
}

fn modified(message: &str, modified_count: u64) -> Response {
    Json(json!({
        "success": true,
        "message": message,
        "modified_count": modified_count,
    }))
    .into_response()
}

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "healthy", "service": SERVICE_NAME}))
}

/// POST /apikey/create
pub(super) async fn handle_create_api_key(State(state): State<AppState>) -> ApiResult {
    let api_key = state.engine.store().issue_api_key().await?;
    Ok(Json(json!({
        "api_key": api_key,
        "message": "API key created successfully. Keep it safe; it cannot be recovered.",
    }))
    .into_response())
}

/// POST /project/create
pub(super) async fn handle_create_project(
    State(state): State<AppState>,
    body: Result<Json<ProjectTarget>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let project_id = state
        .engine
        .store()
        .create_project(&body.api_key, &body.project_name)
        .await?;
    Ok(Json(json!({"success": true, "project_id": project_id})).into_response())
}

/// POST /memory/add
pub(super) async fn handle_add_memory(
    State(state): State<AppState>,
    body: Result<Json<AddMemoryBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let count = state
        .engine
        .store()
        .append_fact(&body.api_key, &body.project_name, &body.memory_strand)
        .await?;
    Ok(modified("Memory strand added successfully", count))
}

/// POST /chat/add
pub(super) async fn handle_add_chat(
    State(state): State<AppState>,
    body: Result<Json<AddChatBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let count = state
        .engine
        .store()
        .append_chat(
            &body.api_key,
            &body.project_name,
            &body.user_message,
            &body.assistant_message,
        )
        .await?;
    Ok(modified("Chat added successfully", count))
}

/// POST /summary/add
pub(super) async fn handle_add_summary(
    State(state): State<AppState>,
    body: Result<Json<AddSummaryBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let count = state
        .engine
        .store()
        .append_summary(&body.api_key, &body.project_name, &body.summary)
        .await?;
    Ok(modified("Summary added successfully", count))
}

/// GET /chat/recent
pub(super) async fn handle_recent_chats(
    State(state): State<AppState>,
    query: Result<Query<RecentChatsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let limit = match query.limit {
        None => state.recent_chat_limit,
        Some(limit) => usize::try_from(limit)
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(StrandError::from(ValidationError::Limit))?,
    };
    let recent_chats = state
        .engine
        .store()
        .recent_chats(&query.api_key, &query.project_name, limit)
        .await?;
    Ok(Json(json!({"recent_chats": recent_chats})).into_response())
}

/// GET /project
pub(super) async fn handle_get_project(
    State(state): State<AppState>,
    query: Result<Query<ProjectTarget>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let project = state
        .engine
        .store()
        .get_project(&query.api_key, &query.project_name)
        .await?;
    Ok(Json(project).into_response())
}

/// POST /recall
pub(super) async fn handle_recall(
    State(state): State<AppState>,
    body: Result<Json<RecallBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let context = state
        .engine
        .recall(
            &body.api_key,
            &body.openai_key,
            &body.project_name,
            &body.chat_pair,
        )
        .await?;
    Ok(Json(context).into_response())
}
