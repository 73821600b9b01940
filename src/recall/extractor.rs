use crate::error::GenerationError;
use crate::llm::GenerationGateway;
use crate::llm::prompts::{FACT_EXTRACTOR_PROMPT, chat_pair_prompt};
use crate::store::ChatPair;
use crate::store::validate::MAX_CONTENT_CHARS;
use std::collections::HashSet;

/// Extract candidate facts stated by the user in the latest turn.
///
/// Entries repeated within one reply are kept once; entries exceeding the
/// stored-content bound are dropped.
pub async fn extract_facts(
    generation: &GenerationGateway,
    pair: &ChatPair,
) -> Result<Vec<String>, GenerationError> {
    let raw = generation
        .complete_structured(FACT_EXTRACTOR_PROMPT, &chat_pair_prompt(pair))
        .await?;

    let mut seen = HashSet::new();
    let facts = raw
        .into_iter()
        .filter(|fact| {
            if fact.chars().count() > MAX_CONTENT_CHARS {
                tracing::warn!(chars = fact.chars().count(), "dropping oversized extracted fact");
                return false;
            }
            seen.insert(fact.clone())
        })
        .collect();
    Ok(facts)
}
