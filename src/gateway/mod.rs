//! Axum HTTP surface for the recall engine.
//!
//! - JSON bodies and query strings in snake_case
//! - Request body size limit and per-request timeout from `[gateway]`
//! - Per-endpoint, per-client-IP rate limits from `[rate_limits]`
//! - Permissive CORS

mod handlers;
pub mod rate_limit;

use handlers::{
    handle_add_chat, handle_add_memory, handle_add_summary, handle_create_api_key,
    handle_create_project, handle_get_project, handle_health, handle_recall, handle_recent_chats,
};
use rate_limit::RateLimiter;

use crate::backends::Backends;
use crate::config::{Config, GatewayConfig};
use crate::llm;
use crate::recall::RecallEngine;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecallEngine>,
    pub limiter: Arc<RateLimiter>,
    /// Default page size for `GET /chat/recent`
    pub recent_chat_limit: usize,
}

impl AppState {
    pub fn new(engine: Arc<RecallEngine>, config: &Config) -> Self {
        Self {
            engine,
            limiter: Arc::new(RateLimiter::new(config.rate_limits.clone())),
            recent_chat_limit: config.recall.recent_chat_limit,
        }
    }
}

fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

pub fn router(state: AppState, gateway: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/apikey/create", post(handle_create_api_key))
        .route("/project/create", post(handle_create_project))
        .route("/project", get(handle_get_project))
        .route("/memory/add", post(handle_add_memory))
        .route("/chat/add", post(handle_add_chat))
        .route("/chat/recent", get(handle_recent_chats))
        .route("/summary/add", post(handle_add_summary))
        .route("/recall", post(handle_recall))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(gateway.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(gateway.request_timeout_secs),
        ))
}

/// Run the HTTP gateway on `[gateway] host:port`.
pub async fn run_gateway(config: Arc<Config>) -> Result<()> {
    let host = config.gateway.host.clone();
    if is_public_bind(&host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be reachable from other machines.\n\
             Fix: use --host 127.0.0.1 (default) or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{}", config.gateway.port)
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(&host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener until Ctrl-C, then drain
/// queued consolidations.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();

    let backends = Backends::open(&config).await?;
    let engine = Arc::new(RecallEngine::new(
        backends.store,
        backends.vector,
        llm::openai_factory(&config.model),
        config.recall.clone(),
        &config.consolidation,
    ));
    let app = router(AppState::new(Arc::clone(&engine), &config), &config.gateway);

    tracing::info!(
        addr = %format!("{host}:{actual_port}"),
        workers = config.consolidation.workers,
        "gateway listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "failed to listen for shutdown signal");
        }
    })
    .await
    .context("serve gateway")?;

    tracing::info!("gateway stopped; draining consolidation queue");
    engine.shutdown().await;
    Ok(())
}
