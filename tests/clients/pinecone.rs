use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strandkeep::vector::{FactMetadata, PineconeVectorStore, VectorRecord, VectorStore};

fn record() -> VectorRecord {
    VectorRecord {
        id: "demo-0123456789abcdef_1".into(),
        values: vec![0.5, -0.5],
        metadata: FactMetadata {
            project_name: "demo".into(),
            fact_text: "The user likes pasta.".into(),
        },
    }
}

#[tokio::test]
async fn upsert_posts_one_vector_into_the_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .and(header("api-key", "pcsk_test"))
        .and(body_json(json!({
            "vectors": [{
                "id": "demo-0123456789abcdef_1",
                "values": [0.5, -0.5],
                "metadata": {"project_name": "demo", "fact_text": "The user likes pasta."},
            }],
            "namespace": "demo-0123456789abcdef",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let store = PineconeVectorStore::new(&server.uri(), "pcsk_test", 10).unwrap();
    store.upsert("demo-0123456789abcdef", record()).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn query_returns_matches_with_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({
            "vector": [0.5, -0.5],
            "topK": 2,
            "namespace": "demo-0123456789abcdef",
            "includeMetadata": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {"id": "a", "score": 0.98,
                 "metadata": {"project_name": "demo", "fact_text": "The user likes pasta."}},
                {"id": "b", "score": 0.42},
            ],
            "namespace": "demo-0123456789abcdef",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = PineconeVectorStore::new(&server.uri(), "pcsk_test", 10).unwrap();
    let matches = store
        .query("demo-0123456789abcdef", &[0.5, -0.5], 2)
        .await
        .unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "a");
    assert_eq!(
        matches[0].metadata.as_ref().map(|m| m.fact_text.as_str()),
        Some("The user likes pasta.")
    );
    assert!(matches[1].metadata.is_none());
    server.verify().await;
}

#[tokio::test]
async fn server_errors_surface_without_the_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("index unavailable"))
        .mount(&server)
        .await;

    let store = PineconeVectorStore::new(&server.uri(), "pcsk_secretvalue", 10).unwrap();
    let err = store.query("ns", &[1.0], 1).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("503"));
    assert!(!message.contains("pcsk_secretvalue"));
}
