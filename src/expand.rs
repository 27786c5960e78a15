use std::collections::HashMap;

use anyhow::Context;
use regex::Regex;

use crate::lexicon::Lexicon;

/// Whole-word abbreviation expander.
///
/// One alternation pattern over every Indonesian surface form, longest
/// surface first, applied in a single `replace_all` pass. Substituted output
/// is never re-scanned, so a canonical form that happens to equal another
/// surface form cannot trigger runaway re-expansion.
pub struct Expander {
    pattern: Option<Regex>,
    replacements: HashMap<String, String>,
}

impl Expander {
    pub fn new(lexicon: &Lexicon) -> anyhow::Result<Self> {
        let surfaces: Vec<String> = lexicon
            .abbreviations()
            .iter()
            .map(|(s, _)| regex::escape(s))
            .collect();
        if surfaces.is_empty() {
            return Ok(Self {
                pattern: None,
                replacements: HashMap::new(),
            });
        }

        // The alternation preserves the lexicon's longest-first order; the
        // regex engine tries branches in order, so "udh2" wins over "udh".
        let pattern = format!(r"(?i)\b(?:{})\b", surfaces.join("|"));
        let pattern = Regex::new(&pattern).context("build abbreviation pattern")?;

        let replacements = lexicon
            .abbreviations()
            .iter()
            .map(|(s, c)| (s.clone(), c.clone()))
            .collect();

        Ok(Self {
            pattern: Some(pattern),
            replacements,
        })
    }

    /// Expands every whole-word lexicon match, leaving everything else
    /// (spacing, punctuation, unknown words) untouched.
    pub fn expand(&self, text: &str) -> String {
        let Some(pattern) = self.pattern.as_ref() else {
            return text.to_string();
        };
        pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                self.replacements
                    .get(&matched.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| matched.to_string())
            })
            .into_owned()
    }
}
