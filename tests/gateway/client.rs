use strandkeep::error::GenerationError;
use strandkeep::llm::prompts::QUESTION_PLANNER_PROMPT;
use strandkeep::store::ChatPair;
use strandkeep::{StrandError, StrandkeepClient, ValidationError};

use super::recall_harness::{engine_with, memory_config, scripted_model, spawn_gateway};

#[tokio::test]
async fn connect_creates_the_project_once() {
    let model = scripted_model();
    let config = memory_config();
    let engine = engine_with(&model, &config).await;
    let base = spawn_gateway(engine.clone(), &config).await;
    let api_key = engine.store().issue_api_key().await.unwrap();

    let client = StrandkeepClient::connect(&base, &api_key, "sk-caller", "assistant")
        .await
        .unwrap();
    assert_eq!(client.project_name(), "assistant");
    assert!(engine.store().get_project(&api_key, "assistant").await.is_ok());

    let err = StrandkeepClient::connect(&base, &api_key, "sk-caller", "assistant")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, StrandError::Duplicate));

    let err = StrandkeepClient::connect(&base, &api_key, "sk-caller", "bad name!")
        .await
        .err()
        .unwrap();
    match err {
        StrandError::Validation(ValidationError::Rejected(detail)) => {
            assert!(detail.starts_with("invalid project name"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn recall_returns_context_and_maps_failures() {
    let model = scripted_model();
    let config = memory_config();
    let engine = engine_with(&model, &config).await;
    let base = spawn_gateway(engine.clone(), &config).await;
    let api_key = engine.store().issue_api_key().await.unwrap();
    let client = StrandkeepClient::connect(&base, &api_key, "sk-caller", "demo")
        .await
        .unwrap();
    engine
        .store()
        .append_summary(&api_key, "demo", "The user is vegetarian.")
        .await
        .unwrap();

    let context = client
        .recall(&ChatPair::new("What should I cook?", "Let me think."))
        .await
        .unwrap();
    assert_eq!(context.summary, "The user is vegetarian.");
    assert!(context.recent_chats.is_empty());
    assert!(context.ragged_memory.is_empty());

    model.script(QUESTION_PLANNER_PROMPT, "no questions today");
    let err = client
        .recall(&ChatPair::new("hi", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StrandError::Generation(GenerationError::Completion(_))
    ));

    let err = client
        .recall(&ChatPair::new("   ", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StrandError::Validation(ValidationError::Rejected(_))
    ));

    engine.shutdown().await;
}

#[tokio::test]
async fn throttled_recall_is_unavailable() {
    let model = scripted_model();
    let mut config = memory_config();
    config.rate_limits.recall = 0;
    let engine = engine_with(&model, &config).await;
    let base = spawn_gateway(engine.clone(), &config).await;
    let api_key = engine.store().issue_api_key().await.unwrap();

    let client = StrandkeepClient::connect(&base, &api_key, "sk-caller", "demo")
        .await
        .unwrap();
    let err = client
        .recall(&ChatPair::new("hi", "hello"))
        .await
        .unwrap_err();
    match err {
        StrandError::Unavailable(detail) => assert!(detail.starts_with("429")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_gateway_is_unavailable() {
    let err = StrandkeepClient::connect(
        "http://127.0.0.1:9",
        "rcll_00000000-0000-0000-0000-000000000000",
        "sk-caller",
        "demo",
    )
    .await
    .err()
    .unwrap();
    assert!(matches!(err, StrandError::Unavailable(_)));
}
