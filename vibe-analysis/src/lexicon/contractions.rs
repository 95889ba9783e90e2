//! Contraction expansion ("don't" → "do not").

use std::borrow::Cow;

/// Contractions that do not follow the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("won't", "will not"),
    ("can't", "cannot"),
    ("shan't", "shall not"),
    ("ain't", "is not"),
    ("let's", "let us"),
    ("y'all", "you all"),
    ("ma'am", "madam"),
    ("o'clock", "of the clock"),
];

/// Words whose `'s` means "is" rather than a possessive.
const IS_CONTRACTIONS: &[&str] = &[
    "it", "he", "she", "that", "what", "there", "here", "who", "where", "how", "when", "why",
];

/// Expand English contractions, keeping everything else byte-for-byte.
///
/// Curly apostrophes are treated as straight ones. Possessive `'s` is
/// dropped so "mom's" becomes "mom".
pub fn expand_contractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut word = String::new();

    for ch in text.chars() {
        let ch = match ch {
            '\u{2019}' | '\u{2018}' => '\'',
            other => other,
        };
        if ch.is_alphabetic() || ch == '\'' {
            word.push(ch);
        } else {
            flush(&mut out, &mut word);
            out.push(ch);
        }
    }
    flush(&mut out, &mut word);

    out
}

fn flush(out: &mut String, word: &mut String) {
    if !word.is_empty() {
        out.push_str(&expand_word(word));
        word.clear();
    }
}

fn expand_word(word: &str) -> Cow<'_, str> {
    // Quotes around a word are not part of it.
    let core = word.trim_matches('\'');
    if !core.contains('\'') {
        return Cow::Borrowed(word);
    }

    let start = word.len() - word.trim_start_matches('\'').len();
    let end = start + core.len();
    let (lead, trail) = (&word[..start], &word[end..]);

    let lower = core.to_lowercase();
    if let Some((_, expanded)) = IRREGULAR.iter().find(|(from, _)| *from == lower) {
        return Cow::Owned(format!("{lead}{}{trail}", match_case(core, expanded)));
    }

    let Some(split) = core.rfind('\'') else {
        return Cow::Borrowed(word);
    };
    let (base, suffix) = (&core[..split], &core[split + 1..]);
    let base_lower = base.to_lowercase();

    let expanded = match suffix.to_lowercase().as_str() {
        "t" if base_lower.ends_with('n') => {
            format!("{} not", &base[..base.len() - 1])
        }
        "re" => format!("{base} are"),
        "ll" => format!("{base} will"),
        "ve" => format!("{base} have"),
        "m" => format!("{base} am"),
        "d" => format!("{base} would"),
        "s" if IS_CONTRACTIONS.contains(&base_lower.as_str()) => format!("{base} is"),
        "s" => base.to_string(),
        _ => return Cow::Borrowed(word),
    };

    Cow::Owned(format!("{lead}{expanded}{trail}"))
}

/// Capitalize the expansion when the original started with a capital.
fn match_case(original: &str, expanded: &str) -> String {
    match (original.chars().next(), expanded.chars().next()) {
        (Some(o), Some(e)) if o.is_uppercase() => {
            let mut out: String = e.to_uppercase().collect();
            out.push_str(&expanded[e.len_utf8()..]);
            out
        }
        _ => expanded.to_string(),
    }
}
