//! Frequency-dictionary spelling corrector.
//!
//! Corrects a word to the most frequent dictionary word one edit away
//! (delete, transpose, replace, insert). Words that are already known, too
//! short, or have no known neighbour come back unchanged.

use std::collections::HashMap;

use vibe_common::{Error, Result};

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Words shorter than this are never corrected.
const MIN_CORRECTABLE_LEN: usize = 4;

/// Dictionary-backed spelling corrector.
#[derive(Debug, Clone, Default)]
pub struct SpellCorrector {
    counts: HashMap<String, u32>,
}

impl SpellCorrector {
    /// Parse a dictionary: one `word` or `word count` per line, `#` comments.
    ///
    /// Words without a count are ranked by position, earliest most frequent.
    pub fn from_source(source: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .collect();

        let total = lines.len() as u32;
        let mut counts = HashMap::with_capacity(lines.len());

        for (rank, (line_no, line)) in lines.into_iter().enumerate() {
            let mut parts = line.split_whitespace();
            let word = parts.next().unwrap_or_default().to_lowercase();
            if !word.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::Config(format!(
                    "dictionary line {line_no}: '{word}' is not a plain word"
                )));
            }

            let count = match parts.next() {
                Some(count) => count.parse().map_err(|_| {
                    Error::Config(format!("dictionary line {line_no}: bad count '{count}'"))
                })?,
                None => total - rank as u32,
            };

            counts.entry(word).or_insert(count);
        }

        Ok(Self { counts })
    }

    /// Add words as known spellings without raising existing counts.
    pub fn extend<I>(&mut self, words: I)
    where
        I: IntoIterator<Item = String>,
    {
        for word in words {
            self.counts.entry(word).or_insert(1);
        }
    }

    pub fn known(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Best known word one edit away, if any.
    pub fn suggest(&self, word: &str) -> Option<&str> {
        if word.len() < MIN_CORRECTABLE_LEN || !word.is_ascii() || self.known(word) {
            return None;
        }

        edits1(word)
            .into_iter()
            .filter_map(|candidate| self.counts.get_key_value(candidate.as_str()))
            .max_by(|(a_word, a_count), (b_word, b_count)| {
                // Highest count wins; ties go to the lexically smaller word.
                a_count.cmp(b_count).then_with(|| b_word.cmp(a_word))
            })
            .map(|(word, _)| word.as_str())
    }

    /// Corrected spelling, or the word itself when no correction applies.
    pub fn correct(&self, word: &str) -> String {
        self.suggest(word).unwrap_or(word).to_string()
    }
}

/// All strings one edit away from `word` (ASCII lowercase input).
fn edits1(word: &str) -> Vec<String> {
    let bytes = word.as_bytes();
    let n = bytes.len();
    let mut out = Vec::with_capacity(54 * n + 25);

    for i in 0..=n {
        let (left, right) = (&word[..i], &word[i..]);

        if !right.is_empty() {
            // delete
            out.push(format!("{}{}", left, &right[1..]));
        }
        if right.len() > 1 {
            // transpose
            let r = right.as_bytes();
            out.push(format!(
                "{}{}{}{}",
                left,
                r[1] as char,
                r[0] as char,
                &right[2..]
            ));
        }
        for c in ALPHABET.chars() {
            if !right.is_empty() {
                // replace
                out.push(format!("{}{}{}", left, c, &right[1..]));
            }
            // insert
            out.push(format!("{}{}{}", left, c, right));
        }
    }

    out
}
