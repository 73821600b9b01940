use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallConfig {
    /// Chat pairs returned as `recent_chats`
    #[serde(default = "default_recent_chat_limit")]
    pub recent_chat_limit: usize,
    /// Facts fetched per planned question
    #[serde(default = "default_top_k")]
    pub retrieval_top_k: usize,
    /// Similar facts shown to the duplicate judge
    #[serde(default = "default_top_k")]
    pub dedup_top_k: usize,
}

fn default_recent_chat_limit() -> usize {
    3
}

fn default_top_k() -> usize {
    2
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            recent_chat_limit: default_recent_chat_limit(),
            retrieval_top_k: default_top_k(),
            dedup_top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    /// Background consolidation workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Jobs waiting beyond this are dropped with a warning
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Re-fold attempts when another writer appended a summary first
    #[serde(default = "default_summary_cas_attempts")]
    pub summary_cas_attempts: u32,
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    256
}

fn default_summary_cas_attempts() -> u32 {
    3
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            summary_cas_attempts: default_summary_cas_attempts(),
        }
    }
}

/// Requests per minute per client IP, per endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_create_project")]
    pub create_project: u32,
    #[serde(default = "default_add_memory")]
    pub add_memory: u32,
    #[serde(default = "default_add_chat")]
    pub add_chat: u32,
    #[serde(default = "default_add_summary")]
    pub add_summary: u32,
    #[serde(default = "default_recent_chats")]
    pub recent_chats: u32,
    #[serde(default = "default_get_project")]
    pub get_project: u32,
    #[serde(default = "default_recall")]
    pub recall: u32,
    #[serde(default = "default_create_api_key")]
    pub create_api_key: u32,
    #[serde(default = "default_health")]
    pub health: u32,
}

fn default_create_project() -> u32 {
    10
}
fn default_add_memory() -> u32 {
    50
}
fn default_add_chat() -> u32 {
    100
}
fn default_add_summary() -> u32 {
    20
}
fn default_recent_chats() -> u32 {
    30
}
fn default_get_project() -> u32 {
    20
}
fn default_recall() -> u32 {
    30
}
fn default_create_api_key() -> u32 {
    5
}
fn default_health() -> u32 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            create_project: default_create_project(),
            add_memory: default_add_memory(),
            add_chat: default_add_chat(),
            add_summary: default_add_summary(),
            recent_chats: default_recent_chats(),
            get_project: default_get_project(),
            recall: default_recall(),
            create_api_key: default_create_api_key(),
            health: default_health(),
        }
    }
}
