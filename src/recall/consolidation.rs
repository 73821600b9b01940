use super::dedup::{Verdict, judge_candidate};
use super::extractor::extract_facts;
use super::summary::fold_summary;
use crate::config::{ConsolidationConfig, RecallConfig};
use crate::error::Result;
use crate::llm::GenerationGateway;
use crate::store::validate::MAX_CONTENT_CHARS;
use crate::store::{ChatPair, ProjectStore};
use crate::vector::{Namespace, VectorMemory};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One completed turn waiting to be folded into long-term memory.
pub struct ConsolidationJob {
    pub api_key: String,
    pub project_name: String,
    pub chat_pair: ChatPair,
    pub generation: GenerationGateway,
}

impl ConsolidationJob {
    pub fn namespace(&self) -> Namespace {
        Namespace::for_project(&self.api_key, &self.project_name)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub accepted: Vec<String>,
    pub rejected: usize,
    pub summary_revised: bool,
}

/// Background half of a recall: persist the turn, extract and deduplicate
/// facts, fold them into the rolling summary.
///
/// Runs for one namespace at a time; different namespaces proceed in
/// parallel.
pub struct Consolidator {
    store: ProjectStore,
    vector: VectorMemory,
    dedup_top_k: usize,
    summary_cas_attempts: u32,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Consolidator {
    pub fn new(
        store: ProjectStore,
        vector: VectorMemory,
        recall: &RecallConfig,
        consolidation: &ConsolidationConfig,
    ) -> Self {
        Self {
            store,
            vector,
            dedup_top_k: recall.dedup_top_k,
            summary_cas_attempts: consolidation.summary_cas_attempts.max(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn namespace_lock(&self, namespace: &Namespace) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(namespace.as_str().to_owned())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Only a failed chat append aborts the job. Everything after it is
    /// best-effort per fact.
    pub async fn run(&self, job: &ConsolidationJob) -> Result<ConsolidationReport> {
        let namespace = job.namespace();
        let lock = self.namespace_lock(&namespace);
        let _guard = lock.lock().await;

        self.store
            .append_chat(
                &job.api_key,
                &job.project_name,
                &job.chat_pair.user,
                &job.chat_pair.assistant,
            )
            .await?;

        let mut report = ConsolidationReport::default();
        let candidates = match extract_facts(&job.generation, &job.chat_pair).await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(namespace = %namespace, error = %error, "fact extraction failed");
                return Ok(report);
            }
        };

        for candidate in candidates {
            let verdict = judge_candidate(
                &self.vector,
                &job.generation,
                &namespace,
                &candidate,
                self.dedup_top_k,
            )
            .await;
            if verdict == Verdict::Reject {
                report.rejected += 1;
                continue;
            }

            if let Err(error) = self
                .store
                .append_fact(&job.api_key, &job.project_name, &candidate)
                .await
            {
                tracing::warn!(namespace = %namespace, error = %error, "failed to persist fact");
                continue;
            }
            if let Err(error) = self
                .vector
                .upsert_fact(candidate.trim(), &namespace, &job.generation)
                .await
            {
                tracing::warn!(namespace = %namespace, error = %error, "failed to index fact");
            }
            report.accepted.push(candidate);
        }

        match self.fold_into_summary(job, &report.accepted).await {
            Ok(revised) => report.summary_revised = revised,
            Err(error) => {
                tracing::warn!(namespace = %namespace, error = %error, "summary consolidation failed");
            }
        }

        tracing::info!(
            namespace = %namespace,
            accepted = report.accepted.len(),
            rejected = report.rejected,
            summary_revised = report.summary_revised,
            "consolidation finished"
        );
        Ok(report)
    }

    /// Fold into the latest revision; refold when another writer appended
    /// first. A fold longer than the content limit is skipped, so a full
    /// summary stays at its last revision.
    async fn fold_into_summary(&self, job: &ConsolidationJob, facts: &[String]) -> Result<bool> {
        if facts.is_empty() {
            return Ok(false);
        }

        for attempt in 1..=self.summary_cas_attempts {
            let project = self
                .store
                .get_project(&job.api_key, &job.project_name)
                .await?;
            let revisions = project.summaries.len();

            let Some(next) = fold_summary(&job.generation, project.current_summary(), facts).await?
            else {
                return Ok(false);
            };
            let chars = next.chars().count();
            if chars > MAX_CONTENT_CHARS {
                tracing::warn!(
                    project = %job.project_name,
                    chars,
                    max = MAX_CONTENT_CHARS,
                    "summary reached maximum length; revision not stored"
                );
                return Ok(false);
            }

            if self
                .store
                .append_summary_if_revision(&job.api_key, &job.project_name, revisions, &next)
                .await?
            {
                return Ok(true);
            }
            tracing::debug!(
                project = %job.project_name,
                attempt,
                "summary revision moved during fold; retrying"
            );
        }

        tracing::warn!(
            project = %job.project_name,
            attempts = self.summary_cas_attempts,
            "summary fold kept losing to concurrent writers; giving up"
        );
        Ok(false)
    }
}
