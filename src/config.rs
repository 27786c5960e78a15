use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "jembatan.toml";
pub const CONFIG_ENV_VAR: &str = "JEMBATAN_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub providers: ProvidersSection,
    #[serde(default)]
    pub lexicon: LexiconSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PipelineSection {
    /// Primary translation backend name (entry under [providers.backends]).
    #[serde(default)]
    pub translate_backend: Option<String>,
    /// Optional fallback backend, tried once when the primary fails.
    #[serde(default)]
    pub alt_translate_backend: Option<String>,

    /// Fixed rate-limit window in seconds (default 60).
    #[serde(default)]
    pub rate_limit_window_secs: Option<u64>,
    /// Messages allowed per sender per window (default 6).
    #[serde(default)]
    pub rate_limit_max: Option<u32>,

    /// Translation cache capacity (default 2048).
    #[serde(default)]
    pub cache_capacity: Option<usize>,

    /// JSONL usage log path; unset disables logging.
    #[serde(default)]
    pub usage_log: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ProvidersSection {
    #[serde(default)]
    pub backends: HashMap<String, ProviderBackend>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ProviderBackend {
    /// "google_web" or "openai_chat".
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Environment variable holding the API key, if the backend needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LexiconSection {
    /// TOML table of extra/override abbreviation entries.
    #[serde(default)]
    pub abbreviations: Option<String>,
    /// TOML table of extra/override zh->id vocab entries.
    #[serde(default)]
    pub vocab: Option<String>,
    /// Ordered [[rule]] list replacing the built-in polish rules.
    #[serde(default)]
    pub polish: Option<String>,
}

impl LexiconSection {
    /// Resolves the override paths relative to the config file directory.
    pub fn resolved_paths(
        &self,
        config_path: &Path,
    ) -> (Option<PathBuf>, Option<PathBuf>, Option<PathBuf>) {
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |p: &Option<String>| {
            p.as_deref().map(|p| {
                let p = PathBuf::from(p);
                if p.is_relative() {
                    dir.join(p)
                } else {
                    p
                }
            })
        };
        (
            resolve(&self.abbreviations),
            resolve(&self.vocab),
            resolve(&self.polish),
        )
    }
}

pub fn find_file_upwards(start: &Path, filename: &str, max_depth: usize) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    for _ in 0..max_depth {
        let d = dir?;
        let candidate = d.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = d.parent().map(|p| p.to_path_buf());
    }
    None
}

/// Default config search: explicit env var, then upwards from the working
/// directory, then upwards from the executable.
pub fn find_default_config() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(p));
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILENAME, 8) {
            return Some(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, CONFIG_FILENAME, 8) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILENAME);
    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

const DEFAULT_CONFIG_TOML: &str = r#"[pipeline]
translate_backend = "google"
# Optional fallback, tried once when the primary fails or returns nothing:
# alt_translate_backend = "glossary_llm"

# Per-sender fixed window: at most rate_limit_max messages per window.
rate_limit_window_secs = 60
rate_limit_max = 6

cache_capacity = 2048

# JSONL usage log (one record per exchange). Comment out to disable.
usage_log = "jembatan-usage.jsonl"

[providers.backends.google]
kind = "google_web"
timeout_secs = 10
# url = "https://translate.googleapis.com/translate_a/single"

[providers.backends.glossary_llm]
kind = "openai_chat"
url = "http://localhost:8080/v1/chat/completions"
model = "gpt-4o-mini"
# api_key_env = "JEMBATAN_LLM_API_KEY"
timeout_secs = 20

# Lexicon overrides (paths relative to this file).
# [lexicon]
# abbreviations = "lexicon/abbreviations.toml"   # "udh" = "已經"
# vocab = "lexicon/vocab.toml"                   # "水果" = "buah"
# polish = "lexicon/polish.toml"                 # [[rule]] from/to pairs
"#;
