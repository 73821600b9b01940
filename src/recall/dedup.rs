use crate::llm::GenerationGateway;
use crate::llm::prompts::{DEDUP_JUDGE_PROMPT, dedup_prompt};
use crate::vector::{Namespace, VectorMemory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Decide whether `candidate` is new information for `namespace`.
///
/// Fails open: a retrieval failure, an empty neighbourhood, or a failed
/// judge call all accept the candidate.
pub async fn judge_candidate(
    vector: &VectorMemory,
    generation: &GenerationGateway,
    namespace: &Namespace,
    candidate: &str,
    top_k: usize,
) -> Verdict {
    let similar = match vector
        .similar_facts(candidate, namespace, generation, top_k)
        .await
    {
        Ok(similar) => similar,
        Err(error) => {
            tracing::warn!(namespace = %namespace, error = %error, "similarity lookup failed; accepting fact");
            return Verdict::Accept;
        }
    };

    if similar.is_empty() {
        return Verdict::Accept;
    }

    let normalized = normalize_fact(candidate);
    if similar.iter().any(|fact| normalize_fact(fact) == normalized) {
        tracing::debug!(namespace = %namespace, "exact duplicate fact rejected");
        return Verdict::Reject;
    }

    match generation
        .complete(DEDUP_JUDGE_PROMPT, &dedup_prompt(candidate, &similar))
        .await
    {
        Ok(reply) => parse_judgement(&reply),
        Err(error) => {
            tracing::warn!(namespace = %namespace, error = %error, "duplicate judge failed; accepting fact");
            Verdict::Accept
        }
    }
}

/// Only an explicit `fail` rejects.
pub fn parse_judgement(reply: &str) -> Verdict {
    let word = reply
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.'))
        .trim();
    if word.eq_ignore_ascii_case("fail") {
        Verdict::Reject
    } else {
        Verdict::Accept
    }
}

/// Lowercased, whitespace-collapsed, trailing punctuation stripped.
pub fn normalize_fact(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}
