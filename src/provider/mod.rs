mod google;
mod llm;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use thiserror::Error;

use crate::config::ProviderBackend;
use crate::lexicon::Lexicon;

pub use google::GoogleWebProvider;
pub use llm::ChatLlmProvider;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single machine-translation backend. Implementations are untrusted and
/// unreliable; every failure mode surfaces as a `ProviderError` for the
/// dispatcher to handle.
pub trait TranslateProvider: Send + Sync {
    /// Backend name as configured, for result attribution.
    fn name(&self) -> &str;

    /// Translates `text`; an empty result is an error, never a success.
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("provider returned an empty translation")]
    Empty,
}

/// Builds a provider from a named config backend entry.
pub fn build_provider(
    name: &str,
    backend: &ProviderBackend,
    lexicon: Arc<Lexicon>,
) -> anyhow::Result<Box<dyn TranslateProvider>> {
    let timeout = backend
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let api_key = match backend.api_key_env.as_deref() {
        Some(var) => Some(
            std::env::var(var).with_context(|| format!("backend {name}: read api key ${var}"))?,
        ),
        None => None,
    };

    match backend.kind.as_str() {
        "google_web" => Ok(Box::new(GoogleWebProvider::new(
            name,
            backend.url.as_deref(),
            timeout,
        )?)),
        "openai_chat" => {
            let url = backend
                .url
                .as_deref()
                .ok_or_else(|| anyhow!("backend {name}: openai_chat requires a url"))?;
            let model = backend
                .model
                .as_deref()
                .ok_or_else(|| anyhow!("backend {name}: openai_chat requires a model"))?;
            Ok(Box::new(ChatLlmProvider::new(
                name, url, model, api_key, timeout, lexicon,
            )?))
        }
        other => Err(anyhow!("backend {name}: unknown provider kind {other:?}")),
    }
}
