//! Text normalization — raw extracted text in, clean token stream out.
//!
//! Empty or garbled input is a value here, not an error: a document that
//! normalizes to nothing produces an empty token stream and scores 0
//! downstream.

use std::collections::BTreeSet;

/// Technology names that punctuation stripping would otherwise destroy.
/// Rewritten before tokenization so they survive as single terms.
const TECH_ALIASES: &[(&str, &str)] = &[
    ("c++", "cplusplus"),
    ("c#", "csharp"),
    (".net", "dotnet"),
    ("node.js", "nodejs"),
    ("react.js", "reactjs"),
    ("vue.js", "vuejs"),
];

const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
    "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in",
    "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "you", "your", "yours",
];

/// The built-in English stop-word set. Used when configuration does not
/// override `stop_words`.
pub fn default_stop_words() -> BTreeSet<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Normalizes raw document text into a token stream: lower-cased,
/// punctuation-stripped, stop words removed. One instance serves a whole
/// batch so every document is tokenized under the same rules.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stop_words: BTreeSet<String>,
}

impl Normalizer {
    pub fn new(stop_words: BTreeSet<String>) -> Self {
        Self { stop_words }
    }

    /// Tokenizes one document. Tokens must start with an ASCII letter;
    /// single characters and standalone digit runs are dropped, mirroring
    /// how resumes are preprocessed upstream of vectorization.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut lowered = text.to_lowercase();
        for (alias, rewrite) in TECH_ALIASES {
            if lowered.contains(alias) {
                lowered = lowered.replace(alias, rewrite);
            }
        }

        lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| w.len() > 1)
            .filter(|w| w.starts_with(|c: char| c.is_ascii_alphabetic()))
            .filter(|w| !self.stop_words.contains(*w))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(default_stop_words())
    }
}
