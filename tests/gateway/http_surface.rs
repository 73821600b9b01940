use reqwest::StatusCode;
use serde_json::{Value, json};
use strandkeep::llm::prompts::{
    FACT_EXTRACTOR_PROMPT, QUESTION_PLANNER_PROMPT, SUMMARY_CONSOLIDATOR_PROMPT,
};

use super::recall_harness::{
    engine_with, http_client, memory_config, scripted_model, spawn_gateway,
};

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client.post(url).json(&body).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn get(client: &reqwest::Client, url: String, query: &[(&str, &str)]) -> (StatusCode, Value) {
    let response = client.get(url).query(query).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_service_name() {
    let model = scripted_model();
    let config = memory_config();
    let base = spawn_gateway(engine_with(&model, &config).await, &config).await;

    let (status, body) = get(&http_client(), format!("{base}/health"), &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "strandkeep"}));
}

#[tokio::test]
async fn project_lifecycle_over_http() {
    let model = scripted_model();
    let config = memory_config();
    let base = spawn_gateway(engine_with(&model, &config).await, &config).await;
    let client = http_client();

    let (status, body) = post(&client, format!("{base}/apikey/create"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let api_key = body["api_key"].as_str().unwrap().to_string();
    assert!(api_key.starts_with("rcll_"));
    assert_eq!(api_key.len(), 41);

    let target = json!({"api_key": api_key, "project_name": "demo"});
    let (status, body) = post(&client, format!("{base}/project/create"), target.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["project_id"].as_str().is_some_and(|id| !id.is_empty()));

    let (status, body) = post(&client, format!("{base}/project/create"), target).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "project with this name already exists for this user"
    );

    let (status, body) = post(
        &client,
        format!("{base}/memory/add"),
        json!({"api_key": api_key, "project_name": "demo", "memory_strand": "  The user likes pasta.  "}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modified_count"], 1);

    for turn in 1..=4 {
        let (status, _) = post(
            &client,
            format!("{base}/chat/add"),
            json!({
                "api_key": api_key,
                "project_name": "demo",
                "user_message": format!("question {turn}"),
                "assistant_message": format!("answer {turn}"),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = post(
        &client,
        format!("{base}/summary/add"),
        json!({"api_key": api_key, "project_name": "demo", "summary": "Likes Italian food."}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(
        &client,
        format!("{base}/chat/recent"),
        &[("api_key", api_key.as_str()), ("project_name", "demo"), ("limit", "2")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["recent_chats"],
        json!([
            {"user": "question 3", "assistant": "answer 3"},
            {"user": "question 4", "assistant": "answer 4"},
        ])
    );

    let (status, body) = get(
        &client,
        format!("{base}/chat/recent"),
        &[("api_key", api_key.as_str()), ("project_name", "demo")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recent_chats"].as_array().unwrap().len(), 3);

    let (status, body) = get(
        &client,
        format!("{base}/project"),
        &[("api_key", api_key.as_str()), ("project_name", "demo")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_name"], "demo");
    assert_eq!(body["memory_strands"][0]["content"], "The user likes pasta.");
    assert_eq!(body["summaries"].as_array().unwrap().len(), 2);
    assert_eq!(body["chat_history"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn longest_chat_pair_fits_the_default_body_limit() {
    let model = scripted_model();
    let config = memory_config();
    let base = spawn_gateway(engine_with(&model, &config).await, &config).await;
    let client = http_client();

    let (_, body) = post(&client, format!("{base}/apikey/create"), json!({})).await;
    let api_key = body["api_key"].as_str().unwrap().to_string();
    let target = json!({"api_key": api_key, "project_name": "wide"});
    let (status, _) = post(&client, format!("{base}/project/create"), target).await;
    assert_eq!(status, StatusCode::OK);

    let message = "😀".repeat(10_000);
    let (status, body) = post(
        &client,
        format!("{base}/chat/add"),
        json!({
            "api_key": api_key,
            "project_name": "wide",
            "user_message": message,
            "assistant_message": message,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = get(
        &client,
        format!("{base}/chat/recent"),
        &[("api_key", api_key.as_str()), ("project_name", "wide")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recent_chats"][0]["user"].as_str(), Some(message.as_str()));
    assert_eq!(body["recent_chats"][0]["assistant"].as_str(), Some(message.as_str()));
}

#[tokio::test]
async fn errors_use_detail_bodies_and_matching_statuses() {
    let model = scripted_model();
    let config = memory_config();
    let base = spawn_gateway(engine_with(&model, &config).await, &config).await;
    let client = http_client();

    let (_, body) = post(&client, format!("{base}/apikey/create"), json!({})).await;
    let api_key = body["api_key"].as_str().unwrap().to_string();

    let (status, body) = post(
        &client,
        format!("{base}/project/create"),
        json!({"api_key": "not-a-key", "project_name": "demo"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "invalid API key format");

    let (status, body) = post(
        &client,
        format!("{base}/project/create"),
        json!({"api_key": api_key, "project_name": "bad name!"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("invalid project name"));

    let (status, body) = post(
        &client,
        format!("{base}/memory/add"),
        json!({"api_key": api_key, "project_name": "ghost", "memory_strand": "fact"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "project not found");

    let (status, body) = post(
        &client,
        format!("{base}/memory/add"),
        json!({"api_key": api_key, "project_name": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("invalid request body"));

    let (status, body) = get(
        &client,
        format!("{base}/chat/recent"),
        &[("api_key", api_key.as_str()), ("project_name", "ghost"), ("limit", "0")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "limit must be a positive integer");

    let (status, _) = get(
        &client,
        format!("{base}/project"),
        &[("api_key", api_key.as_str()), ("project_name", "ghost")],
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recall_over_http_returns_context_then_consolidates() {
    let model = scripted_model();
    let config = memory_config();
    let engine = engine_with(&model, &config).await;
    let base = spawn_gateway(engine.clone(), &config).await;
    let client = http_client();

    let api_key = engine.store().issue_api_key().await.unwrap();
    engine.store().create_project(&api_key, "demo").await.unwrap();

    model.script(QUESTION_PLANNER_PROMPT, r#"["What does the user eat?"]"#);
    model.script(FACT_EXTRACTOR_PROMPT, r#"["The user is vegetarian."]"#);
    model.script(SUMMARY_CONSOLIDATOR_PROMPT, "The user has dietary preferences.");

    let (status, body) = post(
        &client,
        format!("{base}/recall"),
        json!({
            "api_key": api_key,
            "openai_key": "sk-caller",
            "project_name": "demo",
            "chat_pair": {"user": "I'm vegetarian", "assistant": "Got it"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"recent_chats": [], "summary": "", "ragged_memory": []})
    );

    engine.shutdown().await;

    let (status, body) = get(
        &client,
        format!("{base}/project"),
        &[("api_key", api_key.as_str()), ("project_name", "demo")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_history"], json!([{"user": "I'm vegetarian", "assistant": "Got it"}]));
    assert_eq!(body["memory_strands"][0]["content"], "The user is vegetarian.");
    assert_eq!(body["summaries"][1]["summary"], "The user has dietary preferences.");
}

#[tokio::test]
async fn recall_planner_failure_is_bad_gateway() {
    let model = scripted_model();
    let config = memory_config();
    let engine = engine_with(&model, &config).await;
    let base = spawn_gateway(engine.clone(), &config).await;

    let api_key = engine.store().issue_api_key().await.unwrap();
    engine.store().create_project(&api_key, "demo").await.unwrap();
    model.script(QUESTION_PLANNER_PROMPT, "Sure! Here are some questions.");

    let (status, body) = post(
        &http_client(),
        format!("{base}/recall"),
        json!({
            "api_key": api_key,
            "openai_key": "sk-caller",
            "project_name": "demo",
            "chat_pair": {"user": "hi", "assistant": "hello"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("not a list of strings"));
}
