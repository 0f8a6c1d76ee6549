//! Canonical display form for a single name.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

// Leading or trailing run of anything that is not a word character.
// Whitespace counts as non-word, so punctuation and the blanks it exposes
// go together.
static OUTER_NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\W+|\W+$").expect("valid regex"));

const MAX_PASSES: usize = 8;

/// Why a raw entry did not produce a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("empty entry")]
    Empty,
    #[error("shorter than 2 characters")]
    TooShort,
    #[error("entirely numeric")]
    Numeric,
    #[error("no word characters")]
    NoWordCharacters,
    #[error("no alphabetic characters")]
    NoLetters,
}

/// A name in canonical form.
///
/// Only [`normalize`] (and deserialization, which goes through it) creates
/// one, so holding a `NormalizedName` means the text already passed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.0.split(' ').count()
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NormalizedName {
    type Error = Rejection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize(&value)
    }
}

impl From<NormalizedName> for String {
    fn from(name: NormalizedName) -> Self {
        name.0
    }
}

/// Normalize one raw entry.
///
/// Steps: trim, collapse inner whitespace, drop outer punctuation, title-case
/// each space-separated token, then reject results that cannot be a name.
pub fn normalize(raw: &str) -> Result<NormalizedName, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Empty);
    }

    let mut cased = WHITESPACE_RUN.replace_all(trimmed, " ").into_owned();
    // Case mapping can produce characters outside the word class, which a
    // second strip would remove. Repeat until the form is stable.
    for _ in 0..MAX_PASSES {
        let stripped = OUTER_NON_WORD.replace_all(&cased, "");
        if stripped.is_empty() {
            return Err(Rejection::NoWordCharacters);
        }
        let next = title_case(&stripped);
        if next == cased {
            break;
        }
        cased = next;
    }

    if cased.chars().count() < 2 {
        return Err(Rejection::TooShort);
    }
    if cased.chars().all(char::is_numeric) {
        return Err(Rejection::Numeric);
    }
    if !cased.chars().any(char::is_alphabetic) {
        return Err(Rejection::NoLetters);
    }

    Ok(NormalizedName(cased))
}

/// Uppercase the first character of each space-separated token and
/// lowercase the rest. Locale-independent.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, token) in text.split(' ').enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            push_upper(&mut out, first);
            for ch in chars {
                out.extend(ch.to_lowercase());
            }
        }
    }
    out
}

// Characters whose uppercase form expands (e.g. 'ß') stay as they are so
// that normalizing twice changes nothing.
fn push_upper(out: &mut String, ch: char) {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => out.push(single),
        _ => out.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(raw: &str) -> String {
        normalize(raw).unwrap().into_string()
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(ok("  john   doe  "), "John Doe");
        assert_eq!(ok("JANE\tSMITH"), "Jane Smith");
        assert_eq!(ok("mary-ann o'neil"), "Mary-ann O'neil");
    }

    #[test]
    fn test_outer_punctuation_stripped() {
        assert_eq!(ok("--Alice--"), "Alice");
        assert_eq!(ok("\"Bob Jones\","), "Bob Jones");
        assert_eq!(ok("- .carol"), "Carol");
        assert_eq!(ok("Dr. Who?"), "Dr. Who");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(normalize(""), Err(Rejection::Empty));
        assert_eq!(normalize("   "), Err(Rejection::Empty));
        assert_eq!(normalize("!!!"), Err(Rejection::NoWordCharacters));
        assert_eq!(normalize("a"), Err(Rejection::TooShort));
        assert_eq!(normalize("123"), Err(Rejection::Numeric));
        assert_eq!(normalize("12 34"), Err(Rejection::NoLetters));
        assert_eq!(normalize("__"), Err(Rejection::NoLetters));
    }

    #[test]
    fn test_unicode_names() {
        assert_eq!(ok("josé  ÁLVAREZ"), "José Álvarez");
        assert_eq!(ok("straße"), "Straße");
        assert_eq!(ok("ßach"), "ßach");
    }

    #[test]
    fn test_idempotent_examples() {
        for raw in ["  john   doe ", "ßach", "--x y--", "ANN-MARIE", "o'CONNOR"] {
            let once = ok(raw);
            assert_eq!(ok(&once), once, "{raw}");
        }
    }

    #[test]
    fn test_case_mapping_outside_word_class() {
        // U+A7D3 is a word character but its uppercase U+A7D2 may not be.
        for raw in ["ab \u{a7d3}", "\u{a7d3}a", "\u{a7d3}bc def"] {
            if let Ok(once) = normalize(raw) {
                assert_eq!(normalize(once.as_str()), Ok(once), "{raw:?}");
            }
        }
    }

    #[test]
    fn test_serde_renormalizes() {
        let name: NormalizedName = serde_json::from_str("\"  ann  lee \"").unwrap();
        assert_eq!(name.as_str(), "Ann Lee");
        assert!(serde_json::from_str::<NormalizedName>("\"1\"").is_err());
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Ann Lee\"");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(normalize("ann").unwrap().word_count(), 1);
        assert_eq!(normalize("ann lee").unwrap().word_count(), 2);
    }
}
