pub mod generation;
pub mod http_client;
pub mod openai;
pub mod prompts;
pub mod scrub;
pub mod structured;
pub mod traits;

pub use generation::GenerationGateway;
pub use openai::OpenAiModel;
pub use scrub::{key_prefix, sanitize_api_error, scrub_secret_patterns};
pub use traits::{Embedder, LanguageModel};

use crate::config::ModelConfig;
use std::sync::Arc;

/// Builds a language-model client bound to a caller-supplied credential.
pub type ModelFactory = Arc<dyn Fn(&str) -> Arc<dyn LanguageModel> + Send + Sync>;

/// OpenAI clients sharing one connection pool, one per caller key.
pub fn openai_factory(config: &ModelConfig) -> ModelFactory {
    let config = config.clone();
    let client = http_client::build_http_client(config.timeout_secs);
    Arc::new(move |api_key: &str| -> Arc<dyn LanguageModel> {
        Arc::new(OpenAiModel::with_client(&config, api_key, client.clone()))
    })
}
