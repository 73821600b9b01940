use crate::error::GenerationError;
use std::future::Future;
use std::pin::Pin;

/// Language-model service boundary: one chat completion, one embedding.
pub trait LanguageModel: Send + Sync {
    /// Service identifier (e.g. "openai").
    fn name(&self) -> &str;

    fn chat_complete<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<f32>>> + Send + 'a>>;
}

/// Text-to-vector function handed to the vector memory.
pub trait Embedder: Send + Sync {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, GenerationError>> + Send + 'a>>;
}
