use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strandkeep::config::ModelConfig;
use strandkeep::error::GenerationError;
use strandkeep::llm::{GenerationGateway, LanguageModel, OpenAiModel, openai_factory};

fn config(base_url: &str) -> ModelConfig {
    ModelConfig {
        base_url: base_url.to_string(),
        ..ModelConfig::default()
    }
}

#[tokio::test]
async fn chat_completion_sends_system_and_user_messages() {
    let server = MockServer::start().await;
    let config = config(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-caller"))
        .and(body_partial_json(json!({
            "model": config.chat_model,
            "messages": [
                {"role": "system", "content": "You plan questions."},
                {"role": "user", "content": "Latest chat pair"},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "[\"q?\"]"}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = OpenAiModel::new(&config, "sk-caller");
    let reply = model
        .chat_complete("You plan questions.", "Latest chat pair")
        .await
        .unwrap();
    assert_eq!(reply, "[\"q?\"]");
    server.verify().await;
}

#[tokio::test]
async fn embedding_request_uses_configured_model() {
    let server = MockServer::start().await;
    let config = config(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-caller"))
        .and(body_json(json!({
            "model": "text-embedding-3-small",
            "input": "The user likes pasta.",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = OpenAiModel::new(&config, "sk-caller");
    let vector = model.embed("The user likes pasta.").await.unwrap();
    assert_eq!(vector, vec![0.1_f32, 0.2_f32, 0.3_f32]);
    server.verify().await;
}

#[tokio::test]
async fn factory_binds_each_callers_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [1.0]}],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [2.0]}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = openai_factory(&config(&server.uri()));
    assert_eq!(factory("sk-first").embed("x").await.unwrap(), vec![1.0]);
    assert_eq!(factory("sk-second").embed("x").await.unwrap(), vec![2.0]);
    server.verify().await;
}

#[tokio::test]
async fn provider_errors_are_scrubbed_before_surfacing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided: sk-leakedsecret123"},
        })))
        .mount(&server)
        .await;

    let gateway = GenerationGateway::new(std::sync::Arc::new(OpenAiModel::new(
        &config(&server.uri()),
        "sk-leakedsecret123",
    )));
    let err = gateway.complete("system", "user").await.unwrap_err();
    assert!(matches!(err, GenerationError::Completion(_)));
    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(!message.contains("leakedsecret123"));
}

#[tokio::test]
async fn empty_choices_are_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let model = OpenAiModel::new(&config(&server.uri()), "sk-caller");
    assert!(model.chat_complete("system", "user").await.is_err());
}
