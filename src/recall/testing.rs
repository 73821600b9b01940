//! In-memory backends and the scripted model for recall unit tests.

use crate::llm::prompts::{DEDUP_JUDGE_PROMPT, FACT_EXTRACTOR_PROMPT, QUESTION_PLANNER_PROMPT};
use crate::llm::{LanguageModel, ModelFactory};
use crate::store::sqlite::{IN_MEMORY_DATABASE, open_pool};
use crate::store::{ProjectStore, SqliteDocumentStore};
use crate::vector::{SqliteVectorStore, VectorMemory};
use std::sync::Arc;

#[path = "../../tests/support/scripted_model.rs"]
mod scripted_model;

pub(crate) use scripted_model::ScriptedModel;

pub(crate) async fn memory_vector() -> VectorMemory {
    let pool = open_pool(IN_MEMORY_DATABASE).await.unwrap();
    VectorMemory::new(Arc::new(SqliteVectorStore::new(pool).await.unwrap()))
}

/// Project store and vector memory sharing one in-memory database.
pub(crate) async fn memory_backends() -> (ProjectStore, VectorMemory) {
    let pool = open_pool(IN_MEMORY_DATABASE).await.unwrap();
    let docs = SqliteDocumentStore::new(pool.clone()).await.unwrap();
    let vectors = SqliteVectorStore::new(pool).await.unwrap();
    (
        ProjectStore::new(Arc::new(docs)),
        VectorMemory::new(Arc::new(vectors)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::math::cosine_similarity;

    #[test]
    fn embedding_is_stable_and_discriminating() {
        let a = ScriptedModel::embedding("The user likes pasta.");
        assert_eq!(a, ScriptedModel::embedding("The user likes pasta."));
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-5);
        let b = ScriptedModel::embedding("The user dislikes mushrooms.");
        assert!(cosine_similarity(&a, &b) < 0.9);
    }
}
