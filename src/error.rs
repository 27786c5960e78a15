use thiserror::Error;

/// Per-message failure taxonomy. Every variant maps to a short tagged reply
/// in the user's language context; none of them aborts the process or affects
/// later messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("empty or punctuation-only input")]
    EmptyInput,

    #[error("unsupported language")]
    UnsupportedLanguage,

    #[error("sender exceeded the rate limit")]
    RateLimited,

    #[error("translation failed: {0}")]
    TranslationFailed(String),
}

impl ReplyError {
    /// User-visible reply text for this failure.
    pub fn user_reply(&self) -> &'static str {
        match self {
            ReplyError::EmptyInput => "⚠️ 請輸入有效文字",
            ReplyError::UnsupportedLanguage => "⚠️ 僅支援中文與印尼文",
            ReplyError::RateLimited => "⚠️ 訊息太頻繁，請稍後再試",
            ReplyError::TranslationFailed(_) => "⚠️ 翻譯失敗",
        }
    }
}
