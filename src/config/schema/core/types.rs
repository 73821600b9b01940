use super::super::{
    ConsolidationConfig, GatewayConfig, ModelConfig, RateLimitConfig, RecallConfig, StoreConfig,
    VectorBackend, VectorConfig,
};
use crate::store::sqlite::IN_MEMORY_DATABASE;
use anyhow::Result;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from the config location, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub vector: VectorConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub recall: RecallConfig,

    #[serde(default)]
    pub consolidation: ConsolidationConfig,

    #[serde(default)]
    pub rate_limits: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let strandkeep_dir = home.join(".strandkeep");

        Self {
            workspace_dir: strandkeep_dir.join("workspace"),
            config_path: strandkeep_dir.join("config.toml"),
            gateway: GatewayConfig::default(),
            store: StoreConfig::default(),
            vector: VectorConfig::default(),
            model: ModelConfig::default(),
            recall: RecallConfig::default(),
            consolidation: ConsolidationConfig::default(),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

impl Config {
    /// Document store database, resolved against the workspace directory.
    pub fn database_path(&self) -> String {
        self.resolve_database(&self.store.database)
    }

    /// SQLite vector database, or `None` when it shares the document store's.
    pub fn vector_database_path(&self) -> Option<String> {
        self.vector
            .database
            .as_deref()
            .map(|database| self.resolve_database(database))
    }

    fn resolve_database(&self, database: &str) -> String {
        if database == IN_MEMORY_DATABASE || Path::new(database).is_absolute() {
            return database.to_string();
        }
        self.workspace_dir.join(database).display().to_string()
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.consolidation.workers >= 1,
            "consolidation.workers must be at least 1"
        );
        anyhow::ensure!(
            self.consolidation.queue_capacity >= 1,
            "consolidation.queue_capacity must be at least 1"
        );
        anyhow::ensure!(
            self.consolidation.summary_cas_attempts >= 1,
            "consolidation.summary_cas_attempts must be at least 1"
        );
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.model.temperature),
            "model.temperature must be within 0.0..=2.0"
        );
        anyhow::ensure!(
            self.recall.recent_chat_limit >= 1,
            "recall.recent_chat_limit must be at least 1"
        );

        if self.vector.backend == VectorBackend::Pinecone {
            let host_set = self
                .vector
                .pinecone_host
                .as_deref()
                .is_some_and(|host| !host.trim().is_empty());
            let key_set = self
                .vector
                .pinecone_api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty());
            anyhow::ensure!(
                host_set && key_set,
                "pinecone backend requires vector.pinecone_host and vector.pinecone_api_key"
            );
        }

        Ok(())
    }
}
