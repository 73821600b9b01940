use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(in crate::llm) struct ChatRequest<'a> {
    pub(in crate::llm) model: &'a str,
    pub(in crate::llm) messages: [Message<'a>; 2],
    pub(in crate::llm) temperature: f64,
}

#[derive(Debug, Serialize)]
pub(in crate::llm) struct Message<'a> {
    pub(in crate::llm) role: &'static str,
    pub(in crate::llm) content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct ChatResponse {
    #[serde(default)]
    pub(in crate::llm) choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct Choice {
    pub(in crate::llm) message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct ResponseMessage {
    pub(in crate::llm) content: Option<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::llm) struct EmbeddingRequest<'a> {
    pub(in crate::llm) model: &'a str,
    pub(in crate::llm) input: &'a str,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct EmbeddingResponse {
    #[serde(default)]
    pub(in crate::llm) data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct EmbeddingData {
    pub(in crate::llm) embedding: Vec<f32>,
}
