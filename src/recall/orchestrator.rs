use super::consolidation::{ConsolidationJob, Consolidator};
use super::planner::plan_questions;
use super::worker::ConsolidationPool;
use crate::config::{ConsolidationConfig, RecallConfig};
use crate::error::{Result, ValidationError};
use crate::llm::{GenerationGateway, ModelFactory, key_prefix};
use crate::store::validate::{validate_content, validate_target};
use crate::store::{ChatPair, ProjectStore};
use crate::vector::{Namespace, VectorMemory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Context handed back for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPackage {
    /// Stored turns before this one, oldest first.
    pub recent_chats: Vec<ChatPair>,
    pub summary: String,
    /// Facts retrieved for the planned questions.
    pub ragged_memory: Vec<String>,
}

/// Runs recalls: assembles context on the caller's path and hands the turn
/// to the background consolidation pool.
pub struct RecallEngine {
    store: ProjectStore,
    vector: VectorMemory,
    models: ModelFactory,
    config: RecallConfig,
    pool: ConsolidationPool,
}

impl RecallEngine {
    /// Starts the consolidation workers; call inside a Tokio runtime.
    pub fn new(
        store: ProjectStore,
        vector: VectorMemory,
        models: ModelFactory,
        recall: RecallConfig,
        consolidation: &ConsolidationConfig,
    ) -> Self {
        let consolidator = Arc::new(Consolidator::new(
            store.clone(),
            vector.clone(),
            &recall,
            consolidation,
        ));
        Self {
            pool: ConsolidationPool::start(consolidator, consolidation),
            store,
            vector,
            models,
            config: recall,
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn vector(&self) -> &VectorMemory {
        &self.vector
    }

    pub async fn recall(
        &self,
        api_key: &str,
        openai_key: &str,
        project_name: &str,
        chat_pair: &ChatPair,
    ) -> Result<ContextPackage> {
        validate_target(api_key, project_name)?;
        let user = validate_content("User message", &chat_pair.user)?;
        let assistant = validate_content("Assistant message", &chat_pair.assistant)?;
        if openai_key.trim().is_empty() {
            return Err(ValidationError::Missing("openai_key").into());
        }
        let turn = ChatPair::new(user, assistant);

        let recent_chats = match self
            .store
            .recent_chats(api_key, project_name, self.config.recent_chat_limit)
            .await
        {
            Ok(chats) => chats,
            Err(error) => {
                tracing::warn!(project = %project_name, error = %error, "recent chats unavailable");
                Vec::new()
            }
        };

        let project = self.store.get_project(api_key, project_name).await?;
        let summary = project.current_summary().to_string();

        let generation = GenerationGateway::new((self.models)(openai_key.trim()));
        let questions = plan_questions(&generation, &turn).await?;

        let namespace = Namespace::for_project(api_key, project_name);
        let ragged_memory = self
            .vector
            .retrieve_for_questions(
                &questions,
                &namespace,
                &generation,
                self.config.retrieval_top_k,
            )
            .await;

        tracing::info!(
            key = %key_prefix(api_key),
            project = %project_name,
            model = generation.model_name(),
            questions = questions.len(),
            facts = ragged_memory.len(),
            "recall assembled"
        );

        self.pool.schedule(ConsolidationJob {
            api_key: api_key.to_string(),
            project_name: project_name.to_string(),
            chat_pair: turn,
            generation,
        });

        Ok(ContextPackage {
            recent_chats,
            summary,
            ragged_memory,
        })
    }

    /// Stop accepting turns and wait for queued consolidations.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
