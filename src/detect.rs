use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::Lexicon;
use crate::textutil;

/// Translation direction of an inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Chinese,
    Indonesian,
    Unsupported,
}

/// Which classifier rule produced the verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionSource {
    ScriptRatio,
    LexiconHint,
    KeywordHeuristic,
    StatisticalFallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub language: Language,
    pub source: DetectionSource,
}

static ASCII_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("token"));

// Common Indonesian function/time words. Whole-word matched, after the
// lexicon hint failed; kept small on purpose.
static ID_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:saya|aku|kamu|anda|dia|ini|itu|dan|atau|tidak|ya|pagi|siang|sore|malam|besok|kemarin|makan|minum|tidur|tolong|sudah|belum|terima kasih|selamat)\b",
    )
    .expect("id keywords")
});

/// Ordered-rule language classifier; first match wins.
///
/// A single CJK ideograph is enough for the Chinese verdict: these messages
/// are short, and mixed texts like "ok 謝謝" must take the Chinese branch.
/// The caller is responsible for rejecting empty/punctuation-only input.
pub fn classify(lexicon: &Lexicon, text: &str) -> Detection {
    if textutil::cjk_count(text) >= 1 {
        return Detection {
            language: Language::Chinese,
            source: DetectionSource::ScriptRatio,
        };
    }

    for token in ASCII_TOKEN_RE.find_iter(text) {
        if lexicon.is_id_surface(&token.as_str().to_lowercase()) {
            return Detection {
                language: Language::Indonesian,
                source: DetectionSource::LexiconHint,
            };
        }
    }

    if ID_KEYWORD_RE.is_match(text) {
        return Detection {
            language: Language::Indonesian,
            source: DetectionSource::KeywordHeuristic,
        };
    }

    // whatlang is a pure n-gram classifier: same input, same output.
    let language = whatlang::detect(text)
        .map(|info| normalize_lang_code(info.lang().code()))
        .unwrap_or(Language::Unsupported);
    Detection {
        language,
        source: DetectionSource::StatisticalFallback,
    }
}

/// Normalizes an ISO 639-1/639-3 code from the statistical detector.
pub fn normalize_lang_code(code: &str) -> Language {
    let code = code.to_ascii_lowercase();
    if code.starts_with("zh") || code == "cmn" || code == "zho" {
        return Language::Chinese;
    }
    match code.as_str() {
        "id" | "in" | "ind" | "ms" | "msa" | "zsm" => Language::Indonesian,
        _ => Language::Unsupported,
    }
}
