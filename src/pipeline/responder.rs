use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::Utc;
use tracing::{debug, info};

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::config::AppConfig;
use crate::detect::{self, Detection, Language};
use crate::dispatch::Dispatcher;
use crate::error::ReplyError;
use crate::expand::Expander;
use crate::lexicon::Lexicon;
use crate::limiter::{FixedWindowLimiter, DEFAULT_MAX_PER_WINDOW, DEFAULT_WINDOW};
use crate::polish::Polisher;
use crate::provider::{self, GoogleWebProvider, TranslateProvider, DEFAULT_TIMEOUT};
use crate::sink::{log_best_effort, JsonlUsageLog, NullUsageLog, UsageLog, UsageRecord};
use crate::{textutil, timefmt};

const SOURCE_ID: &str = "id";
const TARGET_ZH: &str = "zh-TW";
const REPLY_PREFIX: &str = "🗣️ 翻譯結果：";

/// Final reply plus the intermediate values each stage produced.
#[derive(Clone, Debug)]
pub struct Reply {
    pub text: String,
    pub trace: MessageTrace,
}

/// Stage-by-stage diagnostics for one message.
#[derive(Clone, Debug, Default)]
pub struct MessageTrace {
    pub detection: Option<Detection>,
    pub expanded: Option<String>,
    pub time_normalized: Option<String>,
    pub polished_input: Option<String>,
    pub raw_translation: Option<String>,
    pub backend: Option<String>,
    pub cache_hit: bool,
}

/// Per-message pipeline: empty check -> rate limit -> classify -> branch.
///
/// Indonesian: expand -> normalize times -> translate id->zh-TW -> polish.
/// Chinese: polish input -> translate zh-TW->id (no expansion — those rules
/// are Indonesian-only and would misfire on romanized names).
///
/// Stateless across messages except for the translation cache and the rate
/// limiter; safe to share across threads through `&self`.
pub struct MessageResponder {
    lexicon: Arc<Lexicon>,
    expander: Expander,
    polisher: Polisher,
    dispatcher: Dispatcher,
    limiter: FixedWindowLimiter,
    usage_log: Box<dyn UsageLog>,
}

impl MessageResponder {
    pub fn from_config(cfg: &AppConfig, config_path: &Path) -> anyhow::Result<Self> {
        let (abbrev, vocab, polish) = cfg.lexicon.resolved_paths(config_path);
        let lexicon = Arc::new(Lexicon::with_overrides(
            abbrev.as_deref(),
            vocab.as_deref(),
            polish.as_deref(),
        )?);

        let primary_name = cfg
            .pipeline
            .translate_backend
            .as_deref()
            .unwrap_or("google");
        let primary = build_backend(cfg, primary_name, Arc::clone(&lexicon))
            .with_context(|| format!("build primary backend {primary_name}"))?;
        let secondary = cfg
            .pipeline
            .alt_translate_backend
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|name| {
                build_backend(cfg, name, Arc::clone(&lexicon))
                    .with_context(|| format!("build fallback backend {name}"))
            })
            .transpose()?;

        let limiter = FixedWindowLimiter::new(
            cfg.pipeline
                .rate_limit_window_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_WINDOW),
            cfg.pipeline.rate_limit_max.unwrap_or(DEFAULT_MAX_PER_WINDOW),
        );
        let dispatcher = Dispatcher::new(
            primary,
            secondary,
            cfg.pipeline.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
        );

        let usage_log: Box<dyn UsageLog> = match cfg.pipeline.usage_log.as_deref() {
            Some(path) => {
                let mut p = std::path::PathBuf::from(path);
                if p.is_relative() {
                    if let Some(dir) = config_path.parent() {
                        p = dir.join(p);
                    }
                }
                Box::new(JsonlUsageLog::new(p))
            }
            None => Box::new(NullUsageLog),
        };

        Self::with_parts(lexicon, dispatcher, limiter, usage_log)
    }

    /// Assembles a responder from pre-built collaborators; the constructor
    /// used by tests.
    pub fn with_parts(
        lexicon: Arc<Lexicon>,
        dispatcher: Dispatcher,
        limiter: FixedWindowLimiter,
        usage_log: Box<dyn UsageLog>,
    ) -> anyhow::Result<Self> {
        let expander = Expander::new(&lexicon)?;
        let polisher = Polisher::new(&lexicon);
        Ok(Self {
            lexicon,
            expander,
            polisher,
            dispatcher,
            limiter,
            usage_log,
        })
    }

    /// Processes one inbound message. Never panics and never propagates an
    /// error: every failure becomes a short tagged reply, and one bad
    /// message cannot affect the next.
    pub fn respond(&self, sender: &str, text: &str) -> Reply {
        let mut trace = MessageTrace::default();
        match self.process(sender, text, &mut trace) {
            Ok(reply) => Reply { text: reply, trace },
            Err(e) => {
                info!(sender, error = %e, "message rejected");
                Reply {
                    text: e.user_reply().to_string(),
                    trace,
                }
            }
        }
    }

    fn process(
        &self,
        sender: &str,
        text: &str,
        trace: &mut MessageTrace,
    ) -> Result<String, ReplyError> {
        let trimmed = text.trim();
        if textutil::is_effectively_empty(trimmed) {
            return Err(ReplyError::EmptyInput);
        }
        if !self.limiter.allow(sender) {
            return Err(ReplyError::RateLimited);
        }

        let detection = detect::classify(&self.lexicon, trimmed);
        trace.detection = Some(detection);
        debug!(sender, ?detection, "classified message");

        match detection.language {
            Language::Indonesian => {
                let expanded = self.expander.expand(trimmed);
                trace.expanded = Some(expanded.clone());
                let normalized = timefmt::normalize_times(&expanded);
                trace.time_normalized = Some(normalized.clone());

                let dispatched = self
                    .dispatcher
                    .translate(&normalized, SOURCE_ID, TARGET_ZH)
                    .map_err(|e| ReplyError::TranslationFailed(e.to_string()))?;
                trace.raw_translation = Some(dispatched.text.clone());
                trace.backend = Some(dispatched.backend.clone());
                trace.cache_hit = dispatched.cache_hit;

                let polished = self.polisher.polish(&dispatched.text);
                let reply = format!("{REPLY_PREFIX}{polished}");
                self.log(sender, trimmed, &reply, "id->zh", &dispatched.backend);
                Ok(reply)
            }
            Language::Chinese => {
                let polished_input = self.polisher.polish(trimmed);
                trace.polished_input = Some(polished_input.clone());

                let dispatched = self
                    .dispatcher
                    .translate(&polished_input, TARGET_ZH, SOURCE_ID)
                    .map_err(|e| ReplyError::TranslationFailed(e.to_string()))?;
                trace.raw_translation = Some(dispatched.text.clone());
                trace.backend = Some(dispatched.backend.clone());
                trace.cache_hit = dispatched.cache_hit;

                let reply = format!("{REPLY_PREFIX}{}", dispatched.text);
                self.log(sender, trimmed, &reply, "zh->id", &dispatched.backend);
                Ok(reply)
            }
            Language::Unsupported => Err(ReplyError::UnsupportedLanguage),
        }
    }

    fn log(&self, sender: &str, original: &str, reply: &str, direction: &str, backend: &str) {
        log_best_effort(
            self.usage_log.as_ref(),
            &UsageRecord {
                timestamp: Utc::now(),
                sender: sender.to_string(),
                original: original.to_string(),
                reply: reply.to_string(),
                direction: direction.to_string(),
                backend: Some(backend.to_string()),
            },
        );
    }
}

fn build_backend(
    cfg: &AppConfig,
    name: &str,
    lexicon: Arc<Lexicon>,
) -> anyhow::Result<Box<dyn TranslateProvider>> {
    if let Some(backend) = cfg.providers.backends.get(name) {
        return provider::build_provider(name, backend, lexicon);
    }
    // The default backend works without any config at all.
    if name == "google" {
        return Ok(Box::new(GoogleWebProvider::new(name, None, DEFAULT_TIMEOUT)?));
    }
    Err(anyhow!("backend not configured: {name}"))
}
