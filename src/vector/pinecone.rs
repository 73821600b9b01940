use super::traits::{FactMetadata, VectorMatch, VectorRecord, VectorStore};
use crate::llm::http_client::build_http_client;
use crate::llm::scrub::api_error;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

const PINECONE_API_VERSION: &str = "2024-07";

/// Pinecone data-plane client for a single index host.
pub struct PineconeVectorStore {
    client: reqwest::Client,
    upsert_url: String,
    query_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: [UpsertVector<'a>; 1],
    namespace: &'a str,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a FactMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<FactMetadata>,
}

impl PineconeVectorStore {
    pub fn new(index_host: &str, api_key: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let host = index_host.trim().trim_end_matches('/');
        anyhow::ensure!(!host.is_empty(), "pinecone index host is empty");
        anyhow::ensure!(!api_key.trim().is_empty(), "pinecone API key is empty");

        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };

        Ok(Self {
            client: build_http_client(timeout_secs),
            upsert_url: format!("{base}/vectors/upsert"),
            query_url: format!("{base}/query"),
            api_key: api_key.to_string(),
        })
    }

    async fn post_upsert(&self, namespace: &str, record: VectorRecord) -> anyhow::Result<()> {
        let body = UpsertRequest {
            vectors: [UpsertVector {
                id: &record.id,
                values: &record.values,
                metadata: &record.metadata,
            }],
            namespace,
        };

        let response = self
            .client
            .post(&self.upsert_url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
            .json(&body)
            .send()
            .await
            .context("pinecone upsert request failed")?;

        if !response.status().is_success() {
            return Err(api_error("Pinecone", response).await);
        }
        Ok(())
    }

    async fn post_query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> anyhow::Result<Vec<VectorMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let body = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&self.query_url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
            .json(&body)
            .send()
            .await
            .context("pinecone query request failed")?;

        if !response.status().is_success() {
            return Err(api_error("Pinecone", response).await);
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .context("invalid pinecone query response")?;

        Ok(parsed
            .matches
            .into_iter()
            .take(top_k)
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}

impl VectorStore for PineconeVectorStore {
    fn name(&self) -> &str {
        "pinecone"
    }

    fn upsert<'a>(
        &'a self,
        namespace: &'a str,
        record: VectorRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.post_upsert(namespace, record).await })
    }

    fn query<'a>(
        &'a self,
        namespace: &'a str,
        vector: &'a [f32],
        top_k: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<VectorMatch>>> + Send + 'a>> {
        Box::pin(async move { self.post_query(namespace, vector, top_k).await })
    }
}
