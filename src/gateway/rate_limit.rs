use super::AppState;
use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateApiKey,
    CreateProject,
    AddMemory,
    AddChat,
    AddSummary,
    RecentChats,
    GetProject,
    Recall,
    Health,
}

impl Endpoint {
    pub fn from_route(method: &Method, path: &str) -> Option<Self> {
        let endpoint = match (method.as_str(), path) {
            ("POST", "/apikey/create") => Self::CreateApiKey,
            ("POST", "/project/create") => Self::CreateProject,
            ("POST", "/memory/add") => Self::AddMemory,
            ("POST", "/chat/add") => Self::AddChat,
            ("POST", "/summary/add") => Self::AddSummary,
            ("GET", "/chat/recent") => Self::RecentChats,
            ("GET", "/project") => Self::GetProject,
            ("POST", "/recall") => Self::Recall,
            ("GET", "/health") => Self::Health,
            _ => return None,
        };
        Some(endpoint)
    }

    fn per_minute(self, limits: &RateLimitConfig) -> u32 {
        match self {
            Self::CreateApiKey => limits.create_api_key,
            Self::CreateProject => limits.create_project,
            Self::AddMemory => limits.add_memory,
            Self::AddChat => limits.add_chat,
            Self::AddSummary => limits.add_summary,
            Self::RecentChats => limits.recent_chats,
            Self::GetProject => limits.get_project,
            Self::Recall => limits.recall,
            Self::Health => limits.health,
        }
    }
}

/// Sliding one-minute window per (endpoint, client IP).
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimitConfig,
    windows: Mutex<HashMap<(Endpoint, IpAddr), VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimitConfig) -> Self {
        Self {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request; `false` when the window is already full.
    pub fn check_and_record(&self, endpoint: Endpoint, client: IpAddr) -> bool {
        self.check_and_record_at(endpoint, client, Instant::now())
    }

    fn check_and_record_at(&self, endpoint: Endpoint, client: IpAddr, now: Instant) -> bool {
        let max = usize::try_from(endpoint.per_minute(&self.limits)).unwrap_or(usize::MAX);
        let cutoff = now.checked_sub(WINDOW);

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let hits = windows.entry((endpoint, client)).or_default();
        if let Some(cutoff) = cutoff {
            while hits.front().is_some_and(|t| *t <= cutoff) {
                hits.pop_front();
            }
        }

        if hits.len() >= max {
            return false;
        }
        hits.push_back(now);
        true
    }
}

pub(super) async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(endpoint) = Endpoint::from_route(request.method(), request.uri().path()) else {
        return next.run(request).await;
    };
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |info| info.0.ip());

    if !state.limiter.check_and_record(endpoint, client) {
        tracing::warn!(?endpoint, %client, "rate limit exceeded");
        let body = serde_json::json!({"detail": "rate limit exceeded"});
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    next.run(request).await
}
