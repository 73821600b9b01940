use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite file for projects and users, relative to the workspace
    /// directory unless absolute. `":memory:"` keeps everything in RAM.
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "strandkeep.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    #[default]
    Sqlite,
    Pinecone,
}

impl VectorBackend {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "pinecone" => Some(Self::Pinecone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VectorConfig {
    /// "sqlite" | "pinecone"
    #[serde(default)]
    pub backend: VectorBackend,
    /// SQLite backend: separate database file. Shares the document store
    /// database when unset.
    #[serde(default)]
    pub database: Option<String>,
    /// Pinecone backend: index host (e.g. `idx-abc.svc.pinecone.io`)
    #[serde(default)]
    pub pinecone_host: Option<String>,
    #[serde(default)]
    pub pinecone_api_key: Option<String>,
}
