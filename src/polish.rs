use crate::lexicon::Lexicon;

const TERMINALS: [char; 3] = ['。', '！', '？'];

/// Phrase-level touch-ups for Chinese output: the lexicon's polish rules
/// applied as literal substitutions in table order, then a guaranteed
/// terminal punctuation mark.
pub struct Polisher {
    rules: Vec<(String, String)>,
}

impl Polisher {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            rules: lexicon.polish_rules().to_vec(),
        }
    }

    /// Idempotent: each rule's replacement contains no other rule's pattern,
    /// and the appended `。` satisfies the terminal check on re-entry.
    pub fn polish(&self, text: &str) -> String {
        let mut out = text.trim().to_string();
        for (from, to) in &self.rules {
            out = out.replace(from.as_str(), to);
        }
        let out_trimmed = out.trim_end();
        if out_trimmed
            .chars()
            .last()
            .map(|c| TERMINALS.contains(&c))
            .unwrap_or(false)
        {
            out_trimmed.to_string()
        } else {
            let mut s = out_trimmed.to_string();
            s.push('。');
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polisher() -> Polisher {
        Polisher::new(&Lexicon::builtin())
    }

    #[test]
    fn appends_terminal_punctuation() {
        assert_eq!(polisher().polish("已經吃了"), "已經吃了。");
    }

    #[test]
    fn keeps_existing_terminal() {
        assert_eq!(polisher().polish("已經吃了。"), "已經吃了。");
        assert_eq!(polisher().polish("真的嗎？"), "真的嗎？");
        assert_eq!(polisher().polish("太好了！"), "太好了！");
    }

    #[test]
    fn phrase_rules_fire() {
        assert_eq!(polisher().polish("謝謝你"), "謝謝。");
        assert_eq!(polisher().polish("好的"), "好。");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(polisher().polish("  已經吃了  "), "已經吃了。");
    }

    #[test]
    fn idempotent() {
        let p = polisher();
        for input in ["謝謝你", "好的", "ok", "已經吃了", "真的嗎？", "  早安  "] {
            let once = p.polish(input);
            assert_eq!(p.polish(&once), once, "not idempotent for {input:?}");
        }
    }
}
