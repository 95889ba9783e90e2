//! Lexicon sentiment scorers.

use super::Lexicon;

/// How many tokens back a negator still flips a valence word.
const NEGATION_WINDOW: usize = 2;

impl Lexicon {
    /// General-purpose score: summed valence of matched tokens divided by
    /// the number of tokens. Empty input scores 0.
    pub fn general_score<S: AsRef<str>>(&self, tokens: &[S]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }

        let total: i32 = tokens
            .iter()
            .filter_map(|token| self.valence(token.as_ref()))
            .sum();

        f64::from(total) / tokens.len() as f64
    }

    /// Polarity score: like [`Lexicon::general_score`], but a valence word is
    /// scaled by a directly preceding intensifier and flipped by a negator
    /// within the negation window.
    pub fn polarity_score<S: AsRef<str>>(&self, tokens: &[S]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(valence) = self.valence(token.as_ref()) else {
                continue;
            };
            let mut score = f64::from(valence);

            if let Some(multiplier) = i
                .checked_sub(1)
                .and_then(|prev| self.intensifier(tokens[prev].as_ref()))
            {
                score *= multiplier;
            }

            let window = i.saturating_sub(NEGATION_WINDOW)..i;
            if tokens[window].iter().any(|t| self.is_negator(t.as_ref())) {
                score = -score;
            }

            total += score;
        }

        total / tokens.len() as f64
    }
}
