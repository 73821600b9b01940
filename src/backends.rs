use crate::config::{Config, VectorBackend};
use crate::store::{ProjectStore, SqliteDocumentStore, open_pool};
use crate::vector::{PineconeVectorStore, SqliteVectorStore, VectorMemory, VectorStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Storage handles shared by the gateway and the CLI.
pub struct Backends {
    pub store: ProjectStore,
    pub vector: VectorMemory,
}

impl Backends {
    pub async fn open(config: &Config) -> Result<Self> {
        let database = config.database_path();
        let pool = open_pool(&database)
            .await
            .with_context(|| format!("open document store at {database}"))?;
        let docs = SqliteDocumentStore::new(pool.clone())
            .await
            .context("initialize document store schema")?;

        let vectors: Arc<dyn VectorStore> = match config.vector.backend {
            VectorBackend::Sqlite => {
                let pool = match config.vector_database_path() {
                    Some(path) => open_pool(&path)
                        .await
                        .with_context(|| format!("open vector store at {path}"))?,
                    None => pool,
                };
                Arc::new(SqliteVectorStore::new(pool).await?)
            }
            VectorBackend::Pinecone => Arc::new(PineconeVectorStore::new(
                config.vector.pinecone_host.as_deref().unwrap_or_default(),
                config.vector.pinecone_api_key.as_deref().unwrap_or_default(),
                config.model.timeout_secs,
            )?),
        };

        tracing::info!(
            database = %database,
            vector_backend = vectors.name(),
            "storage backends ready"
        );
        Ok(Self {
            store: ProjectStore::new(Arc::new(docs)),
            vector: VectorMemory::new(vectors),
        })
    }
}
