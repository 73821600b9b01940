use reqwest::Client;
use std::time::Duration;

/// Shared client settings for the model and Pinecone HTTP clients.
pub fn build_http_client(timeout_secs: u64) -> Client {
    // No-op when a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(error = %error, "falling back to default HTTP client");
            Client::new()
        })
}
