mod types;

use self::types::{ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, Message};
use super::http_client::build_http_client;
use super::scrub::api_error;
use super::traits::LanguageModel;
use crate::config::ModelConfig;
use std::future::Future;
use std::pin::Pin;

/// OpenAI-compatible chat-completions and embeddings client.
pub struct OpenAiModel {
    client: reqwest::Client,
    cached_chat_url: String,
    cached_embeddings_url: String,
    cached_auth_header: String,
    chat_model: String,
    embedding_model: String,
    temperature: f64,
}

impl OpenAiModel {
    pub fn new(config: &ModelConfig, api_key: &str) -> Self {
        Self::with_client(config, api_key, build_http_client(config.timeout_secs))
    }

    /// Reuse an existing connection pool; the caller's key is bound per instance.
    pub fn with_client(config: &ModelConfig, api_key: &str, client: reqwest::Client) -> Self {
        let base = config.base_url.trim_end_matches('/');
        Self {
            client,
            cached_chat_url: format!("{base}/v1/chat/completions"),
            cached_embeddings_url: format!("{base}/v1/embeddings"),
            cached_auth_header: format!("Bearer {api_key}"),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        }
    }

    async fn send_chat(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: [
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.cached_chat_url)
            .header("Authorization", &self.cached_auth_header)
            .json(&request)
            .send()
            .await
            .map_err(|error| anyhow::anyhow!("OpenAI request failed: {error}"))?;

        if !response.status().is_success() {
            return Err(api_error("OpenAI", response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|error| anyhow::anyhow!("OpenAI response JSON decode failed: {error}"))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))
    }

    async fn send_embedding(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response = self
            .client
            .post(&self.cached_embeddings_url)
            .header("Authorization", &self.cached_auth_header)
            .json(&request)
            .send()
            .await
            .map_err(|error| anyhow::anyhow!("Embedding HTTP request failed: {error}"))?;

        if !response.status().is_success() {
            return Err(api_error("OpenAI embeddings", response).await);
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|error| anyhow::anyhow!("Invalid embedding response: {error}"))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| anyhow::anyhow!("Empty embedding result"))?;
        anyhow::ensure!(!embedding.is_empty(), "Empty embedding vector");
        Ok(embedding)
    }
}

impl LanguageModel for OpenAiModel {
    fn name(&self) -> &str {
        "openai"
    }

    fn chat_complete<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move { self.send_chat(system_prompt, user_prompt).await })
    }

    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<f32>>> + Send + 'a>> {
        Box::pin(async move { self.send_embedding(text).await })
    }
}
