use crate::error::GenerationError;
use crate::llm::GenerationGateway;
use crate::llm::prompts::{QUESTION_PLANNER_PROMPT, chat_pair_prompt};
use crate::store::ChatPair;

/// Upper bound on lookups issued for one turn.
pub const MAX_QUESTIONS: usize = 5;

/// Derive memory-lookup questions from the latest turn. An empty list is a
/// valid answer.
pub async fn plan_questions(
    generation: &GenerationGateway,
    pair: &ChatPair,
) -> Result<Vec<String>, GenerationError> {
    let mut questions = generation
        .complete_structured(QUESTION_PLANNER_PROMPT, &chat_pair_prompt(pair))
        .await?;

    questions.dedup();
    if questions.len() > MAX_QUESTIONS {
        tracing::debug!(planned = questions.len(), "truncating planned questions");
        questions.truncate(MAX_QUESTIONS);
    }
    Ok(questions)
}
