use super::math;
use super::traits::{FactMetadata, VectorMatch, VectorRecord, VectorStore};
use anyhow::Context;
use sqlx::SqlitePool;
use std::future::Future;
use std::pin::Pin;

/// Brute-force cosine search over embeddings stored as BLOBs.
///
/// Records are write-once: storing an id that already exists is an error.
pub struct SqliteVectorStore {
    pool: SqlitePool,
}

impl SqliteVectorStore {
    pub async fn new(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS fact_vectors (
                id          TEXT PRIMARY KEY,
                namespace   TEXT NOT NULL,
                embedding   BLOB NOT NULL,
                metadata    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_fact_vectors_namespace ON fact_vectors(namespace);",
        )
        .execute(&pool)
        .await
        .context("create fact_vectors table")?;

        Ok(Self { pool })
    }

    async fn insert(&self, namespace: &str, record: VectorRecord) -> anyhow::Result<()> {
        let metadata = serde_json::to_string(&record.metadata).context("encode fact metadata")?;
        sqlx::query(
            "INSERT INTO fact_vectors (id, namespace, embedding, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.id)
        .bind(namespace)
        .bind(math::vec_to_bytes(&record.values))
        .bind(metadata)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("insert fact vector {}", record.id))?;
        Ok(())
    }

    async fn search(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> anyhow::Result<Vec<VectorMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<(String, Vec<u8>, String)> = sqlx::query_as(
            "SELECT id, embedding, metadata FROM fact_vectors WHERE namespace = ?1",
        )
        .bind(namespace)
        .fetch_all(&self.pool)
        .await
        .context("vector search query")?;

        let mut scored: Vec<VectorMatch> = rows
            .into_iter()
            .map(|(id, blob, metadata)| {
                let score = math::cosine_similarity(vector, &math::bytes_to_vec(&blob));
                let metadata = match serde_json::from_str::<FactMetadata>(&metadata) {
                    Ok(parsed) => Some(parsed),
                    Err(error) => {
                        tracing::warn!(id = %id, error = %error, "unreadable fact metadata");
                        None
                    }
                };
                VectorMatch {
                    id,
                    score,
                    metadata,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

impl VectorStore for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn upsert<'a>(
        &'a self,
        namespace: &'a str,
        record: VectorRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.insert(namespace, record).await })
    }

    fn query<'a>(
        &'a self,
        namespace: &'a str,
        vector: &'a [f32],
        top_k: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<VectorMatch>>> + Send + 'a>> {
        Box::pin(async move { self.search(namespace, vector, top_k).await })
    }
}
