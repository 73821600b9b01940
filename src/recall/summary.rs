use crate::error::GenerationError;
use crate::llm::GenerationGateway;
use crate::llm::prompts::{SUMMARY_CONSOLIDATOR_PROMPT, summary_prompt};

/// Fold accepted facts into `previous`, returning the next revision.
///
/// `Ok(None)` when there is nothing to fold or the model added nothing. The
/// returned text always starts with the trimmed previous summary: output
/// that rewrote the prefix is appended after it instead.
pub async fn fold_summary(
    generation: &GenerationGateway,
    previous: &str,
    facts: &[String],
) -> Result<Option<String>, GenerationError> {
    if facts.is_empty() {
        return Ok(None);
    }

    let output = generation
        .complete(SUMMARY_CONSOLIDATOR_PROMPT, &summary_prompt(previous, facts))
        .await?;
    Ok(preserve_prefix(previous, &output))
}

fn preserve_prefix(previous: &str, output: &str) -> Option<String> {
    let previous = previous.trim();
    let output = output.trim();

    if output.is_empty() || output == previous {
        return None;
    }
    if previous.is_empty() || output.starts_with(previous) {
        return Some(output.to_string());
    }

    tracing::debug!("summary output dropped the previous revision; appending instead");
    Some(format!("{previous} {output}"))
}
