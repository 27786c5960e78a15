//! End-to-end tests over the full message pipeline, with a recording
//! provider standing in for the network backends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use jembatan::dispatch::Dispatcher;
use jembatan::lexicon::Lexicon;
use jembatan::limiter::FixedWindowLimiter;
use jembatan::pipeline::MessageResponder;
use jembatan::provider::{ProviderError, TranslateProvider};
use jembatan::sink::{JsonlUsageLog, NullUsageLog, UsageLog};

const REPLY_PREFIX: &str = "🗣️ 翻譯結果：";

#[derive(Clone)]
struct RecordingProvider {
    name: &'static str,
    reply: Option<&'static str>,
    calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl RecordingProvider {
    fn ok(name: &'static str, reply: &'static str) -> Self {
        Self {
            name,
            reply: Some(reply),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(name: &'static str) -> Self {
        Self {
            name,
            reply: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TranslateProvider for RecordingProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), source.to_string(), target.to_string()));
        match self.reply {
            Some(r) => Ok(r.to_string()),
            None => Err(ProviderError::Empty),
        }
    }
}

fn responder(
    provider: &RecordingProvider,
    max_per_window: u32,
    usage_log: Box<dyn UsageLog>,
) -> MessageResponder {
    let lexicon = Arc::new(Lexicon::builtin());
    let dispatcher = Dispatcher::new(Box::new(provider.clone()), None, 64);
    let limiter = FixedWindowLimiter::new(Duration::from_secs(60), max_per_window);
    MessageResponder::with_parts(lexicon, dispatcher, limiter, usage_log).unwrap()
}

#[test]
fn indonesian_message_is_expanded_and_time_normalized_before_translation() {
    let provider = RecordingProvider::ok("fake", "已經吃了嗎？還沒的話 09:00 吃");
    let r = responder(&provider, 6, Box::new(NullUsageLog));

    let reply = r.respond("u1", "udh makan blm jam 9 pagi");

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    let (sent, source, target) = &calls[0];
    assert!(sent.contains("09:00"), "time not normalized: {sent}");
    assert!(sent.contains("已經"), "abbreviation not expanded: {sent}");
    assert!(!sent.contains("udh"), "raw abbreviation leaked: {sent}");
    assert!(
        !sent.contains("pagi") && !sent.contains("早上"),
        "period word leaked past the time normalizer: {sent}"
    );
    assert_eq!(source, "id");
    assert_eq!(target, "zh-TW");

    assert!(reply.text.starts_with(REPLY_PREFIX));
    let last = reply.text.chars().last().unwrap();
    assert!(matches!(last, '。' | '！' | '？'), "unterminated: {}", reply.text);
}

#[test]
fn afternoon_period_shifts_hour_before_translation() {
    let provider = RecordingProvider::ok("fake", "下午三點過來。");
    let r = responder(&provider, 6, Box::new(NullUsageLog));

    r.respond("u1", "tolong datang jam 3 sore");

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    let sent = &calls[0].0;
    assert!(sent.contains("15:00"), "period shift missing: {sent}");
    assert!(
        !sent.contains("sore") && !sent.contains("下午"),
        "period word leaked: {sent}"
    );
}

#[test]
fn chinese_message_is_polished_then_translated_to_indonesian() {
    let provider = RecordingProvider::ok("fake", "Terima kasih.");
    let r = responder(&provider, 6, Box::new(NullUsageLog));

    let reply = r.respond("u1", "謝謝你");

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    let (sent, source, target) = &calls[0];
    assert_eq!(sent, "謝謝。");
    assert_eq!(source, "zh-TW");
    assert_eq!(target, "id");
    assert_eq!(reply.text, format!("{REPLY_PREFIX}Terima kasih."));
}

#[test]
fn blank_and_punctuation_only_messages_never_reach_a_backend() {
    let provider = RecordingProvider::ok("fake", "x");
    let r = responder(&provider, 6, Box::new(NullUsageLog));

    for input in ["", "   ", "!!!", "…—…"] {
        let reply = r.respond("u1", input);
        assert_eq!(reply.text, "⚠️ 請輸入有效文字", "input: {input:?}");
    }
    assert!(provider.calls().is_empty());
}

#[test]
fn unsupported_language_gets_a_fixed_reply() {
    let provider = RecordingProvider::ok("fake", "x");
    let r = responder(&provider, 6, Box::new(NullUsageLog));

    let reply = r.respond("u1", "The weather is really nice today");
    assert_eq!(reply.text, "⚠️ 僅支援中文與印尼文");
    assert!(provider.calls().is_empty());
}

#[test]
fn rate_limit_rejects_before_any_translation_work() {
    let provider = RecordingProvider::ok("fake", "早安。");
    let r = responder(&provider, 1, Box::new(NullUsageLog));

    let first = r.respond("u1", "selamat pagi");
    assert!(first.text.starts_with(REPLY_PREFIX));

    let second = r.respond("u1", "sudah makan belum");
    assert_eq!(second.text, "⚠️ 訊息太頻繁，請稍後再試");
    assert_eq!(provider.calls().len(), 1);

    // Another sender is unaffected.
    let other = r.respond("u2", "selamat pagi");
    assert!(other.text.starts_with(REPLY_PREFIX));
}

#[test]
fn repeated_messages_are_served_from_cache() {
    let provider = RecordingProvider::ok("fake", "已經吃了。");
    let r = responder(&provider, 10, Box::new(NullUsageLog));

    let first = r.respond("u1", "udah makan");
    let second = r.respond("u1", "udah makan");

    assert_eq!(first.text, second.text);
    assert_eq!(provider.calls().len(), 1);
    assert!(!first.trace.cache_hit);
    assert!(second.trace.cache_hit);
}

#[test]
fn fallback_backend_serves_when_primary_fails() {
    let primary = RecordingProvider::failing("primary");
    let backup = RecordingProvider::ok("backup", "好的。");
    let lexicon = Arc::new(Lexicon::builtin());
    let dispatcher = Dispatcher::new(
        Box::new(primary.clone()),
        Some(Box::new(backup.clone())),
        64,
    );
    let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 6);
    let r = MessageResponder::with_parts(lexicon, dispatcher, limiter, Box::new(NullUsageLog))
        .unwrap();

    let reply = r.respond("u1", "baik, terima kasih");
    assert!(reply.text.starts_with(REPLY_PREFIX));
    assert_eq!(reply.trace.backend.as_deref(), Some("backup"));
    assert_eq!(primary.calls().len(), 1);
    assert_eq!(backup.calls().len(), 1);
}

#[test]
fn translation_failure_with_no_fallback_yields_error_reply() {
    let provider = RecordingProvider::failing("fake");
    let r = responder(&provider, 6, Box::new(NullUsageLog));

    let reply = r.respond("u1", "tolong bantu saya");
    assert_eq!(reply.text, "⚠️ 翻譯失敗");
}

#[test]
fn successful_exchanges_are_appended_to_the_usage_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("usage.jsonl");
    let provider = RecordingProvider::ok("fake", "早安。");
    let r = responder(&provider, 1, Box::new(JsonlUsageLog::new(&log_path)));

    r.respond("u1", "selamat pagi");
    // Rate-limited exchange must not be logged.
    r.respond("u1", "selamat siang");

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["sender"], "u1");
    assert_eq!(record["direction"], "id->zh");
    assert_eq!(record["backend"], "fake");
    assert_eq!(record["original"], "selamat pagi");
}
