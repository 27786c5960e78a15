use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

const ATTEMPTS: usize = 2;
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// One processed exchange, appended to the usage log.
#[derive(Clone, Debug, Serialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub original: String,
    pub reply: String,
    /// "id->zh" or "zh->id".
    pub direction: String,
    pub backend: Option<String>,
}

/// Append-only usage log collaborator. Best-effort: failures are retried a
/// couple of times, then logged and swallowed — never surfaced to the user.
pub trait UsageLog: Send + Sync {
    fn append(&self, record: &UsageRecord) -> anyhow::Result<()>;
}

/// JSON-lines file sink, one record per line.
pub struct JsonlUsageLog {
    path: PathBuf,
}

impl JsonlUsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageLog for JsonlUsageLog {
    fn append(&self, record: &UsageRecord) -> anyhow::Result<()> {
        let line = serde_json::to_string(record).context("serialize usage record")?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open usage log: {}", self.path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("append usage log: {}", self.path.display()))?;
        Ok(())
    }
}

/// Discards every record; used when no log path is configured.
pub struct NullUsageLog;

impl UsageLog for NullUsageLog {
    fn append(&self, _record: &UsageRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Appends with a bounded retry, then gives up quietly.
pub fn log_best_effort(log: &dyn UsageLog, record: &UsageRecord) {
    for attempt in 1..=ATTEMPTS {
        match log.append(record) {
            Ok(()) => return,
            Err(e) if attempt < ATTEMPTS => {
                warn!(error = %e, attempt, "usage log append failed, retrying");
                std::thread::sleep(RETRY_DELAY);
            }
            Err(e) => {
                warn!(error = %e, "usage log append failed, dropping record");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record() -> UsageRecord {
        UsageRecord {
            timestamp: Utc::now(),
            sender: "u1".to_string(),
            original: "udh makan blm".to_string(),
            reply: "🗣️ 翻譯結果：已經吃了嗎。".to_string(),
            direction: "id->zh".to_string(),
            backend: Some("google".to_string()),
        }
    }

    #[test]
    fn jsonl_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlUsageLog::new(dir.path().join("usage.jsonl"));
        sink.append(&record()).unwrap();
        sink.append(&record()).unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["sender"], "u1");
        assert_eq!(parsed["direction"], "id->zh");
    }

    struct FlakySink {
        calls: AtomicUsize,
    }

    impl UsageLog for FlakySink {
        fn append(&self, _: &UsageRecord) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("disk on fire")
        }
    }

    #[test]
    fn best_effort_retries_then_swallows() {
        let sink = FlakySink {
            calls: AtomicUsize::new(0),
        };
        log_best_effort(&sink, &record());
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }
}
