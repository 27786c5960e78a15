use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProviderError, TranslateProvider};
use crate::lexicon::Lexicon;

const MAX_GLOSSARY_ITEMS: usize = 40;

/// LLM-backed translation through an OpenAI-style chat-completions endpoint.
///
/// The prompt embeds a bounded glossary excerpt from the lexicon and pins the
/// model down: canonical `HH:MM` strings and proper nouns must survive the
/// translation verbatim. Temperature 0 for reproducible output.
pub struct ChatLlmProvider {
    name: String,
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    lexicon: Arc<Lexicon>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ChatLlmProvider {
    pub fn new(
        name: &str,
        url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
        lexicon: Arc<Lexicon>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            name: name.to_string(),
            client,
            url: url.to_string(),
            model: model.to_string(),
            api_key,
            lexicon,
        })
    }

    fn system_prompt(&self, text: &str, source: &str, target: &str) -> String {
        let mut prompt = format!(
            "You are a translation engine for caregiver chat messages. \
             Translate the user's message from {source} to {target}. \
             Keep canonical time strings such as 09:00 and all proper nouns \
             exactly as written. Reply with the translation only."
        );
        let glossary = self.lexicon.glossary_for_text(text, source, MAX_GLOSSARY_ITEMS);
        let rendered = Lexicon::render_glossary(&glossary);
        if !rendered.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&rendered);
        }
        prompt
    }
}

impl TranslateProvider for ChatLlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let system = self.system_prompt(text, source, target);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        debug!(backend = %self.name, "chat completion received");
        let translated = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Decode("no choices in response".to_string()))?;
        let translated = translated.trim().to_string();
        if translated.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(translated)
    }
}
