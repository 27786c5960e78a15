use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::{ProviderError, TranslateProvider};

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google Translate via the public web endpoint (the `client=gtx` API used by
/// browser extensions). No key required; treated as best-effort.
pub struct GoogleWebProvider {
    name: String,
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleWebProvider {
    pub fn new(
        name: &str,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            name: name.to_string(),
            client,
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
        })
    }
}

impl TranslateProvider for GoogleWebProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: Value = response.json()?;
        debug!(backend = %self.name, "google web response received");
        let translated = concat_segments(&body).ok_or_else(|| {
            ProviderError::Decode("missing translation segments".to_string())
        })?;
        if translated.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(translated)
    }
}

/// The endpoint answers with nested arrays: `[[["segment", "source", ...], ...], ...]`.
fn concat_segments(body: &Value) -> Option<String> {
    let rows = body.get(0)?.as_array()?;
    let mut out = String::new();
    for row in rows {
        if let Some(segment) = row.get(0).and_then(Value::as_str) {
            out.push_str(segment);
        }
    }
    Some(out)
}
