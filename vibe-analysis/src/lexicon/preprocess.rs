//! Text normalization pipeline.
//!
//! Steps, in order: expand contractions, lowercase, strip non-alphabetic
//! characters, tokenize on whitespace, correct spelling per token, remove
//! stopwords.

use std::sync::Arc;

use super::{expand_contractions, Lexicon};

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    /// Run per-token spelling correction
    pub spell_correct: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            spell_correct: true,
        }
    }
}

/// Output of the normalization pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    /// Lowercased, contraction-expanded text with only letters and whitespace
    pub cleaned: String,
    /// Tokens after spelling correction, stopwords included
    pub tokens: Vec<String>,
    /// `tokens` with stopwords removed
    pub filtered: Vec<String>,
}

/// Stateless text normalizer over a shared lexicon.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    lexicon: Arc<Lexicon>,
}

impl Preprocessor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Run the full pipeline and return the stopword-filtered tokens.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.process(text, PreprocessOptions::default()).filtered
    }

    /// Run the pipeline, keeping the intermediate cleaned text and tokens.
    pub fn process(&self, text: &str, options: PreprocessOptions) -> Preprocessed {
        let cleaned = clean(&expand_contractions(text).to_lowercase());

        let speller = self.lexicon.speller();
        let tokens: Vec<String> = cleaned
            .split_whitespace()
            .map(|token| {
                if options.spell_correct {
                    speller.correct(token)
                } else {
                    token.to_string()
                }
            })
            .collect();

        let filtered = tokens
            .iter()
            .filter(|token| !self.lexicon.is_stopword(token))
            .cloned()
            .collect();

        Preprocessed {
            cleaned,
            tokens,
            filtered,
        }
    }
}

/// Keep ASCII letters and whitespace only.
fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect()
}
