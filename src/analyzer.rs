//! Text analysis: turns raw document/query text into a sequence of terms.
//!
//! Mirrors the normalization pipeline of `examples/original_source/lexer.py`
//! (lowercase → strip non-word runs → tokenize → stopword filter → lemmatize),
//! re-expressed with `unicode-segmentation` for word boundaries and
//! `rust-stemmers`' Porter stemmer standing in for WordNet lemmatization.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Configuration for the [`Analyzer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Drop tokens present in the English stopword list (plus
    /// `additional_stopwords`).
    #[serde(default = "default_remove_stop_words")]
    pub remove_stop_words: bool,

    /// Reduce each surviving token to its lemma (Porter stem).
    #[serde(default = "default_apply_lemmatization")]
    pub apply_lemmatization: bool,

    /// Extra terms to treat as stopwords, in addition to the built-in list.
    #[serde(default)]
    pub additional_stopwords: Vec<String>,
}

fn default_remove_stop_words() -> bool {
    true
}

fn default_apply_lemmatization() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            remove_stop_words: default_remove_stop_words(),
            apply_lemmatization: default_apply_lemmatization(),
            additional_stopwords: Vec::new(),
        }
    }
}

/// Deterministic, thread-safe, pure text analyzer.
///
/// Resources (stopword set, stemmer) are built once in [`Analyzer::new`] and
/// reused for every call to [`Analyzer::tokenize`], per the "loaded once at
/// process start" resource model.
pub struct Analyzer {
    config: AnalyzerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Analyzer {
    /// Build an analyzer from the given configuration.
    pub fn new(config: AnalyzerConfig) -> Self {
        let stemmer = config
            .apply_lemmatization
            .then(|| Stemmer::create(Algorithm::English));

        let mut stopwords: HashSet<String> = if config.remove_stop_words {
            default_stopwords().iter().map(|s| s.to_string()).collect()
        } else {
            HashSet::new()
        };
        if config.remove_stop_words {
            stopwords.extend(config.additional_stopwords.iter().cloned());
        }

        Self {
            config,
            stemmer,
            stopwords,
        }
    }

    /// Tokenize `text` into an ordered sequence of terms, possibly with
    /// repeats. Never fails; empty input yields an empty sequence.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let normalized = replace_non_word_runs(&lowered);

        normalized
            .unicode_words()
            .filter_map(|word| self.process_token(word))
            .collect()
    }

    fn process_token(&self, token: &str) -> Option<String> {
        if self.config.remove_stop_words && self.stopwords.contains(token) {
            return None;
        }

        let term = match &self.stemmer {
            Some(stemmer) => stemmer.stem(token).into_owned(),
            None => token.to_string(),
        };

        Some(term)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

/// Replace every maximal run of non-word characters (anything that is not a
/// letter, digit, or underscore) with a single space.
fn replace_non_word_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push(' ');
            in_run = true;
        }
    }
    out
}

/// Standard English stopword list (comparable in coverage to NLTK's
/// `stopwords.words('english')`).
fn default_stopwords() -> &'static [&'static str] {
    &[
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
        "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
        "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
        "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
        "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
        "wouldn't",
    ]
}
