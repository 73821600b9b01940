use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Metadata stored alongside every fact embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactMetadata {
    pub project_name: String,
    pub fact_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: FactMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<FactMetadata>,
}

/// Similarity-store boundary. Namespaces are hard partitions: a query never
/// sees records upserted under a different namespace.
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &str;

    fn upsert<'a>(
        &'a self,
        namespace: &'a str,
        record: VectorRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Matches ordered most-similar first, at most `top_k` of them.
    fn query<'a>(
        &'a self,
        namespace: &'a str,
        vector: &'a [f32],
        top_k: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<VectorMatch>>> + Send + 'a>>;
}
