use once_cell::sync::Lazy;
use regex::Regex;

static CJK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Han}").expect("cjk"));
static CONTENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]").expect("content"));

pub fn cjk_count(text: &str) -> usize {
    CJK_RE.find_iter(text).count()
}

/// True when the text carries no letters or digits at all, i.e. it is empty
/// or pure punctuation/whitespace/emoji. Such input is rejected before
/// classification.
pub fn is_effectively_empty(text: &str) -> bool {
    !CONTENT_RE.is_match(text)
}
