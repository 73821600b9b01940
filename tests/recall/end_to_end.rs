use strandkeep::StrandError;
use strandkeep::llm::GenerationGateway;
use strandkeep::llm::prompts::{
    DEDUP_JUDGE_PROMPT, FACT_EXTRACTOR_PROMPT, QUESTION_PLANNER_PROMPT,
    SUMMARY_CONSOLIDATOR_PROMPT,
};
use strandkeep::store::ChatPair;
use strandkeep::vector::Namespace;

use super::recall_harness::{engine_with, memory_config, scripted_model};

const PRIOR_SUMMARY: &str = "The user has shared food preferences.";

#[tokio::test]
async fn recall_serves_pre_turn_context_and_learns_from_the_turn() {
    let model = scripted_model();
    let config = memory_config();
    let engine = engine_with(&model, &config).await;
    let store = engine.store().clone();

    let api_key = store.issue_api_key().await.unwrap();
    store.create_project(&api_key, "demo").await.unwrap();
    store
        .append_fact(&api_key, "demo", "The user likes pasta.")
        .await
        .unwrap();
    engine
        .vector()
        .upsert_fact(
            "The user likes pasta.",
            &Namespace::for_project(&api_key, "demo"),
            &GenerationGateway::new(model.clone()),
        )
        .await
        .unwrap();
    store
        .append_summary(&api_key, "demo", PRIOR_SUMMARY)
        .await
        .unwrap();
    store
        .append_chat(&api_key, "demo", "What's for dinner?", "How about pasta?")
        .await
        .unwrap();

    model.script(QUESTION_PLANNER_PROMPT, r#"["What foods does the user like?"]"#);
    model.script(FACT_EXTRACTOR_PROMPT, r#"["The user dislikes mushrooms."]"#);
    model.script(
        SUMMARY_CONSOLIDATOR_PROMPT,
        "The user has shared food preferences. The user has mentioned ingredients they avoid.",
    );

    let turn = ChatPair::new("Also I really dislike mushrooms", "Noted");
    let context = engine
        .recall(&api_key, "sk-caller-key", "demo", &turn)
        .await
        .unwrap();

    assert_eq!(
        context.recent_chats,
        [ChatPair::new("What's for dinner?", "How about pasta?")]
    );
    assert_eq!(context.summary, PRIOR_SUMMARY);
    assert_eq!(context.ragged_memory, ["The user likes pasta."]);
    assert_eq!(model.keys_seen(), ["sk-caller-key"]);

    engine.shutdown().await;

    let project = store.get_project(&api_key, "demo").await.unwrap();
    assert_eq!(project.chat_history.last(), Some(&turn));
    assert_eq!(project.chat_history.len(), 2);
    let facts: Vec<_> = project
        .memory_strands
        .iter()
        .map(|strand| strand.content.as_str())
        .collect();
    assert_eq!(facts, ["The user likes pasta.", "The user dislikes mushrooms."]);
    assert!(project.current_summary().starts_with(PRIOR_SUMMARY));
    assert_eq!(project.summaries.len(), 3);
}

#[tokio::test]
async fn restated_fact_is_rejected_and_stored_once() {
    let model = scripted_model();
    let config = memory_config();
    let engine = engine_with(&model, &config).await;
    let store = engine.store().clone();
    let api_key = store.issue_api_key().await.unwrap();
    store.create_project(&api_key, "demo").await.unwrap();

    model.script(FACT_EXTRACTOR_PROMPT, r#"["The user likes pasta."]"#);
    model.script(SUMMARY_CONSOLIDATOR_PROMPT, "The user has food preferences.");
    model.script(FACT_EXTRACTOR_PROMPT, r#"["The user likes pasta."]"#);

    engine
        .recall(&api_key, "sk-caller-key", "demo", &ChatPair::new("I like pasta", "Nice"))
        .await
        .unwrap();
    engine
        .recall(&api_key, "sk-caller-key", "demo", &ChatPair::new("Pasta again!", "Sure"))
        .await
        .unwrap();
    engine.shutdown().await;

    let project = store.get_project(&api_key, "demo").await.unwrap();
    assert_eq!(project.memory_strands.len(), 1);
    assert_eq!(project.chat_history.len(), 2);
    assert_eq!(project.summaries.len(), 2);
    assert_eq!(model.calls_for(DEDUP_JUDGE_PROMPT), 0);
}

#[tokio::test]
async fn recall_against_missing_project_is_not_found() {
    let model = scripted_model();
    let engine = engine_with(&model, &memory_config()).await;
    let api_key = engine.store().issue_api_key().await.unwrap();

    let err = engine
        .recall(&api_key, "sk-caller-key", "ghost", &ChatPair::new("hi", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, StrandError::NotFound(_)));
    engine.shutdown().await;
}

#[tokio::test]
async fn created_project_starts_with_one_empty_summary() {
    let model = scripted_model();
    let engine = engine_with(&model, &memory_config()).await;
    let store = engine.store();
    let api_key = store.issue_api_key().await.unwrap();
    store.create_project(&api_key, "fresh").await.unwrap();

    let project = store.get_project(&api_key, "fresh").await.unwrap();
    assert!(project.memory_strands.is_empty());
    assert!(project.chat_history.is_empty());
    assert_eq!(project.summaries.len(), 1);
    assert_eq!(project.current_summary(), "");
    engine.shutdown().await;
}
