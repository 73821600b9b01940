//! Fixed instruction templates for the recall and consolidation calls.

use crate::store::ChatPair;

pub const QUESTION_PLANNER_PROMPT: &str = r#"You help an assistant retrieve long-term memory about its user.

Given the latest chat pair (assistant message and user reply), write short,
self-contained questions whose answers are likely already stored in memory:
preferences, past choices, history, or earlier decisions that would help the
assistant answer the next message well.

Rules:
- Ground every question in the current conversation.
- Do not ask about facts the user just stated in this pair.
- Do not invent facts.
- Return at most five questions. Return [] when nothing is worth looking up.

Reply with a JSON array of strings and nothing else.

Example
Assistant: Want me to plan your meals for the week?
User: Yes, but no dairy or red meat.
Output:
["What meals has the user liked before?", "Does the user have other dietary restrictions?", "Which cuisines does the user prefer?"]"#;

pub const FACT_EXTRACTOR_PROMPT: &str = r#"You maintain a memory of what a user has told an assistant.

From the latest chat pair only, extract every meaningful statement made by the
USER: facts, preferences, likes and dislikes, decisions, requests, goals,
opinions, and tentative or speculative statements ("maybe", "I think").

Rules:
- One atomic statement per entry; never merge two facts.
- Write each entry as a standalone sentence about the user, e.g. "The user likes pasta."
- Exclude assistant suggestions or questions unless the user explicitly confirmed them.
- Return [] when the user expressed nothing new.

Reply with a JSON array of strings and nothing else.

Example
Assistant: Any foods you want to avoid this week?
User: I don't eat seafood, and I really like pasta and mushrooms.
Output:
["The user does not eat seafood.", "The user likes pasta.", "The user likes mushrooms."]"#;

pub const DEDUP_JUDGE_PROMPT: &str = r#"You decide whether a candidate memory is new information.

You are given a candidate fact about the user and the most similar facts
already stored. If the candidate says the same thing as a stored fact (even
with different wording), it is a duplicate. If it adds, changes, or refines
information, it is new.

Reply with exactly one word: "fail" if the candidate is a duplicate, "pass"
if it is new information."#;

pub const SUMMARY_CONSOLIDATOR_PROMPT: &str = r#"You maintain a short thematic summary of a user's conversations.

You are given the current summary and a list of newly learned facts. Produce
the updated summary:
- Keep the current summary exactly as it is, word for word, at the start.
- Append one short sentence per new theme, naming only the general topic
  ("The user has mentioned dietary preferences."), never the specific detail.
- Only use the facts provided. Do not answer questions, guess, or add anything
  the facts do not support.
- Never delete, reorder, or reword existing text.

Reply with the updated summary as a single plain paragraph and nothing else."#;

pub fn chat_pair_prompt(pair: &ChatPair) -> String {
    format!(
        "Latest chat pair:\nAssistant: {}\nUser: {}",
        pair.assistant, pair.user
    )
}

pub fn dedup_prompt(candidate: &str, similar: &[String]) -> String {
    let stored = similar
        .iter()
        .map(|fact| format!("- {fact}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Candidate fact: {candidate}\n\nStored facts:\n{stored}")
}

pub fn summary_prompt(previous: &str, facts: &[String]) -> String {
    let facts = serde_json::to_string(facts).unwrap_or_else(|_| facts.join("\n"));
    format!("Current summary: {previous:?}\n\nNew facts: {facts}")
}
