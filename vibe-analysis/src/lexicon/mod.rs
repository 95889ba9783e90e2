//! Lexicon and preprocessing toolkit.
//!
//! A [`Lexicon`] bundles every read-only word resource the local tiers need:
//! the valence table, stopwords, negators and intensifiers, and the spelling
//! dictionary. It is built once at startup and shared by `Arc`; nothing in it
//! changes after construction.

mod contractions;
mod preprocess;
mod scoring;
mod spelling;

pub use contractions::expand_contractions;
pub use preprocess::{PreprocessOptions, Preprocessed, Preprocessor};
pub use spelling::SpellCorrector;

use std::collections::{HashMap, HashSet};
use std::fs;

use tracing::{debug, info};
use vibe_common::{AnalysisConfig, Error, Result, ResultExt};

const VALENCE_SOURCE: &str = include_str!("../../data/valence.txt");
const STOPWORD_SOURCE: &str = include_str!("../../data/stopwords.txt");
const DICTIONARY_SOURCE: &str = include_str!("../../data/words.txt");

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without", "hardly", "barely", "scarcely",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.5),
    ("so", 1.3),
    ("extremely", 2.0),
    ("highly", 1.5),
    ("incredibly", 1.8),
    ("totally", 1.5),
    ("absolutely", 1.8),
    ("super", 1.5),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("barely", 0.5),
];

/// Suffixes tried when a word is missing from the valence table.
const INFLECTIONS: &[&str] = &["s", "es", "ed", "d", "ing", "ly"];

/// Immutable word resources shared by all analyzers.
#[derive(Debug, Clone)]
pub struct Lexicon {
    valence: HashMap<String, i32>,
    stopwords: HashSet<String>,
    negators: HashSet<String>,
    intensifiers: HashMap<String, f64>,
    speller: SpellCorrector,
}

impl Lexicon {
    /// Build the lexicon from the resources compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_sources(VALENCE_SOURCE, STOPWORD_SOURCE, DICTIONARY_SOURCE)
    }

    /// Build the lexicon for an analysis configuration.
    ///
    /// A configured dictionary file replaces the built-in one; failing to read
    /// or parse it is a startup error. Keyword lists are added to the
    /// dictionary so spelling correction never rewrites them.
    pub fn load(config: &AnalysisConfig) -> Result<Self> {
        let mut lexicon = match &config.dictionary_path {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .map_err(|e| Error::Config(e.to_string()))
                    .context(format!("failed to read dictionary {}", path.display()))?;
                info!(path = %path.display(), "Loading custom spelling dictionary");
                Self::from_sources(VALENCE_SOURCE, STOPWORD_SOURCE, &source)
                    .context(format!("invalid dictionary {}", path.display()))?
            }
            None => Self::builtin()?,
        };

        let keywords = &config.keywords;
        let keyword_words = keywords
            .good_news
            .iter()
            .chain(&keywords.bad_news)
            .chain(&keywords.forbidden)
            .chain(&keywords.sensitive)
            .flat_map(|phrase| phrase.split_whitespace())
            .map(str::to_lowercase);
        lexicon.speller.extend(keyword_words);

        debug!(
            valence_words = lexicon.valence.len(),
            stopwords = lexicon.stopwords.len(),
            dictionary_words = lexicon.speller.len(),
            "Lexicon loaded"
        );

        Ok(lexicon)
    }

    /// Build the lexicon from raw text sources.
    pub fn from_sources(valence: &str, stopwords: &str, dictionary: &str) -> Result<Self> {
        let valence = parse_valence(valence)?;
        let stopwords: HashSet<String> = data_lines(stopwords)
            .map(|(_, line)| line.to_lowercase())
            .collect();

        let mut speller = SpellCorrector::from_source(dictionary)?;
        // Every word the scorers know is a correct spelling.
        speller.extend(valence.keys().cloned());
        speller.extend(stopwords.iter().cloned());
        speller.extend(NEGATORS.iter().map(|w| (*w).to_string()));
        speller.extend(INTENSIFIERS.iter().map(|(w, _)| (*w).to_string()));

        Ok(Self {
            valence,
            stopwords,
            negators: NEGATORS.iter().map(|w| (*w).to_string()).collect(),
            intensifiers: INTENSIFIERS
                .iter()
                .map(|(w, m)| ((*w).to_string(), *m))
                .collect(),
            speller,
        })
    }

    /// Valence of a word, retrying without common inflection suffixes.
    pub fn valence(&self, word: &str) -> Option<i32> {
        if let Some(score) = self.valence.get(word) {
            return Some(*score);
        }

        for suffix in INFLECTIONS {
            let Some(base) = word.strip_suffix(suffix) else {
                continue;
            };
            if base.len() < 3 {
                continue;
            }
            if let Some(score) = self.valence.get(base) {
                return Some(*score);
            }
            if let Some(score) = self.valence.get(&format!("{base}e")) {
                return Some(*score);
            }
        }

        None
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn is_negator(&self, word: &str) -> bool {
        self.negators.contains(word)
    }

    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    pub fn speller(&self) -> &SpellCorrector {
        &self.speller
    }
}

/// Non-empty, non-comment lines with their 1-based line numbers.
fn data_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_valence(source: &str) -> Result<HashMap<String, i32>> {
    let mut table = HashMap::new();

    for (line_no, line) in data_lines(source) {
        let mut parts = line.split_whitespace();
        let (Some(word), Some(score), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Config(format!(
                "valence table line {line_no}: expected `word score`"
            )));
        };
        let score: i32 = score.parse().map_err(|_| {
            Error::Config(format!("valence table line {line_no}: bad score '{score}'"))
        })?;
        if !(-5..=5).contains(&score) {
            return Err(Error::Config(format!(
                "valence table line {line_no}: score {score} outside [-5, 5]"
            )));
        }
        table.insert(word.to_lowercase(), score);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_loads() {
        let lexicon = Lexicon::builtin().unwrap();
        assert_eq!(lexicon.valence("love"), Some(3));
        assert_eq!(lexicon.valence("hate"), Some(-3));
        assert!(lexicon.is_stopword("the"));
        assert!(!lexicon.is_stopword("scan"));
        assert!(lexicon.is_negator("never"));
        assert_eq!(lexicon.intensifier("extremely"), Some(2.0));
    }

    #[test]
    fn test_builtin_dictionary_covers_everyday_english() {
        let lexicon = Lexicon::builtin().unwrap();
        let speller = lexicon.speller();
        assert!(speller.len() > 50_000);
        for word in ["mood", "wood", "glove", "bead", "necklace", "cabin", "tomatoes"] {
            assert!(speller.known(word), "{word}");
        }
    }

    #[test]
    fn test_valence_inflections() {
        let lexicon = Lexicon::builtin().unwrap();
        assert_eq!(lexicon.valence("loves"), Some(3));
        assert_eq!(lexicon.valence("loving"), Some(3));
        assert_eq!(lexicon.valence("hates"), Some(-3));
        assert_eq!(lexicon.valence("table"), None);
    }

    #[test]
    fn test_bad_valence_line_is_config_error() {
        let err = Lexicon::from_sources("good three", "", "").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("line 1"));

        let err = Lexicon::from_sources("good 9", "", "").unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_load_with_missing_dictionary_fails() {
        let config = AnalysisConfig {
            dictionary_path: Some("/definitely/not/here/words.txt".into()),
            ..AnalysisConfig::default()
        };
        let err = Lexicon::load(&config).unwrap_err();
        assert!(err.is_config());
        assert!(err
            .to_string()
            .starts_with("failed to read dictionary /definitely/not/here/words.txt"));
    }

    #[test]
    fn test_load_with_malformed_dictionary_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "two words").unwrap();

        let config = AnalysisConfig {
            dictionary_path: Some(file.path().to_path_buf()),
            ..AnalysisConfig::default()
        };
        let err = Lexicon::load(&config).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("invalid dictionary"));
    }

    #[test]
    fn test_load_with_custom_dictionary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "oncology 50\nchemo 40").unwrap();

        let config = AnalysisConfig {
            dictionary_path: Some(file.path().to_path_buf()),
            ..AnalysisConfig::default()
        };
        let lexicon = Lexicon::load(&config).unwrap();
        assert!(lexicon.speller().known("oncology"));
        // Keywords and valence words are always known
        assert!(lexicon.speller().known("metastasis"));
        assert!(lexicon.speller().known("wonderful"));
    }
}
