//! Scripted language model shared by the crate's unit tests and the
//! integration tests. The including module provides the imports below.
#![allow(dead_code)]

use super::{
    DEDUP_JUDGE_PROMPT, FACT_EXTRACTOR_PROMPT, LanguageModel, ModelFactory,
    QUESTION_PLANNER_PROMPT,
};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const EMBEDDING_DIMS: usize = 32;

/// Replies are queued per system prompt. Unscripted planner and extractor
/// calls answer `[]`, the judge answers `pass`, anything else errors.
/// Embeddings are deterministic: equal texts map to equal vectors.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
    calls: Mutex<HashMap<String, usize>>,
    keys: Mutex<Vec<String>>,
    slow: Option<(String, Duration)>,
    fail_embeddings: bool,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    /// Delay every completion whose user prompt contains `marker`.
    pub fn slow_on(mut self, marker: &str, delay: Duration) -> Self {
        self.slow = Some((marker.to_string(), delay));
        self
    }

    pub fn script(&self, system_prompt: &str, reply: impl Into<String>) {
        self.push(system_prompt, Ok(reply.into()));
    }

    pub fn script_err(&self, system_prompt: &str, error: impl Into<String>) {
        self.push(system_prompt, Err(error.into()));
    }

    pub fn calls_for(&self, system_prompt: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(system_prompt)
            .copied()
            .unwrap_or_default()
    }

    /// Caller credentials the factory was asked to bind, in order.
    pub fn keys_seen(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }

    /// Factory handing out `model` for every caller key.
    pub fn factory(model: &Arc<Self>) -> ModelFactory {
        let model = Arc::clone(model);
        Arc::new(move |key: &str| -> Arc<dyn LanguageModel> {
            model.keys.lock().unwrap().push(key.to_string());
            model.clone()
        })
    }

    pub fn embedding(text: &str) -> Vec<f32> {
        let seed = fnv1a64(text.as_bytes());
        (0..EMBEDDING_DIMS as u64)
            .map(|i| {
                let bits = splitmix64(seed ^ i.wrapping_mul(0x9E37_79B9_7F4A_7C15));
                ((bits >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }

    fn push(&self, system_prompt: &str, reply: Result<String, String>) {
        self.replies
            .lock()
            .unwrap()
            .entry(system_prompt.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, system_prompt: &str) -> Result<String, String> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(system_prompt.to_string())
            .or_default() += 1;

        let scripted = self
            .replies
            .lock()
            .unwrap()
            .get_mut(system_prompt)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| match system_prompt {
            QUESTION_PLANNER_PROMPT | FACT_EXTRACTOR_PROMPT => Ok("[]".to_string()),
            DEDUP_JUDGE_PROMPT => Ok("pass".to_string()),
            _ => Err("unscripted prompt".to_string()),
        })
    }
}

impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat_complete<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        let reply = self.next_reply(system_prompt);
        let delay = self
            .slow
            .as_ref()
            .filter(|(marker, _)| user_prompt.contains(marker.as_str()))
            .map(|(_, delay)| *delay);
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply.map_err(|error| anyhow::anyhow!(error))
        })
    }

    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<f32>>> + Send + 'a>> {
        let fail = self.fail_embeddings;
        Box::pin(async move {
            if fail {
                anyhow::bail!("embedding service unavailable");
            }
            Ok(Self::embedding(text))
        })
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
