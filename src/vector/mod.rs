pub mod math;
pub mod pinecone;
pub mod sqlite;
pub mod traits;

pub use pinecone::PineconeVectorStore;
pub use sqlite::SqliteVectorStore;
pub use traits::{FactMetadata, VectorMatch, VectorRecord, VectorStore};

use crate::error::RetrievalError;
use crate::llm::Embedder;
use futures_util::future::join_all;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

const OWNER_HASH_HEX_CHARS: usize = 16;

/// Similarity-store partition for one project.
///
/// Derived from the owner key as well as the project name, so equally named
/// projects of different owners never share vectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    key: String,
    project_name: String,
}

impl Namespace {
    pub fn for_project(owner_api_key: &str, project_name: &str) -> Self {
        let digest = hex::encode(Sha256::digest(owner_api_key.as_bytes()));
        Self {
            key: format!("{project_name}-{}", &digest[..OWNER_HASH_HEX_CHARS]),
            project_name: project_name.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Typed fact-embedding operations over a [`VectorStore`].
#[derive(Clone)]
pub struct VectorMemory {
    store: Arc<dyn VectorStore>,
}

impl VectorMemory {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    /// Embed `text` and insert it under a fresh record id; returns that id.
    pub async fn upsert_fact(
        &self,
        text: &str,
        namespace: &Namespace,
        embedder: &dyn Embedder,
    ) -> Result<String, RetrievalError> {
        let values = embedder.embed(text).await?;
        let id = format!("{namespace}_{}", uuid::Uuid::new_v4());
        let record = VectorRecord {
            id: id.clone(),
            values,
            metadata: FactMetadata {
                project_name: namespace.project_name().to_string(),
                fact_text: text.to_string(),
            },
        };

        self.store
            .upsert(namespace.as_str(), record)
            .await
            .map_err(|error| RetrievalError::Upsert(format!("{error:#}")))?;
        Ok(id)
    }

    /// Top-`k` fact texts for `vector`, most similar first.
    pub async fn query_top_k(
        &self,
        vector: &[f32],
        namespace: &Namespace,
        k: usize,
    ) -> Result<Vec<(String, f32)>, RetrievalError> {
        let matches = self
            .store
            .query(namespace.as_str(), vector, k)
            .await
            .map_err(|error| RetrievalError::Query(format!("{error:#}")))?;

        Ok(matches
            .into_iter()
            .filter_map(|m| m.metadata.map(|meta| (meta.fact_text, m.score)))
            .collect())
    }

    /// Existing facts most similar to `text`.
    pub async fn similar_facts(
        &self,
        text: &str,
        namespace: &Namespace,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Result<Vec<String>, RetrievalError> {
        let vector = embedder.embed(text).await?;
        let hits = self.query_top_k(&vector, namespace, k).await?;
        Ok(hits.into_iter().map(|(text, _)| text).collect())
    }

    /// Union of the top-`k` facts for each question, uniqued by text.
    ///
    /// Questions are looked up concurrently; a failed lookup is logged and
    /// contributes nothing.
    pub async fn retrieve_for_questions(
        &self,
        questions: &[String],
        namespace: &Namespace,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Vec<String> {
        let lookups = questions
            .iter()
            .map(|question| self.similar_facts(question, namespace, embedder, k));
        let results = join_all(lookups).await;

        let mut seen = HashSet::new();
        let mut facts = Vec::new();
        for (question, result) in questions.iter().zip(results) {
            match result {
                Ok(hits) => {
                    for fact in hits {
                        if seen.insert(fact.clone()) {
                            facts.push(fact);
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        namespace = %namespace,
                        question = %question,
                        error = %error,
                        "retrieval failed for question; skipping"
                    );
                }
            }
        }
        facts
    }
}
