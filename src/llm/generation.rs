use super::scrub::sanitize_api_error;
use super::structured::parse_string_list;
use super::traits::{Embedder, LanguageModel};
use crate::error::GenerationError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Single entry point for text generation, structured generation and
/// embeddings. Every failure surfaces as a [`GenerationError`]; nothing is
/// retried here.
#[derive(Clone)]
pub struct GenerationGateway {
    model: Arc<dyn LanguageModel>,
}

impl GenerationGateway {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        self.model
            .chat_complete(system_prompt, user_prompt)
            .await
            .map_err(|error| GenerationError::Completion(sanitize_api_error(&format!("{error:#}"))))
    }

    pub async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Vec<String>, GenerationError> {
        let raw = self.complete(system_prompt, user_prompt).await?;
        parse_string_list(&raw)
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        self.model
            .embed(text)
            .await
            .map_err(|error| GenerationError::Embedding(sanitize_api_error(&format!("{error:#}"))))
    }
}

impl Embedder for GenerationGateway {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, GenerationError>> + Send + 'a>> {
        Box::pin(async move { GenerationGateway::embed(self, text).await })
    }
}
