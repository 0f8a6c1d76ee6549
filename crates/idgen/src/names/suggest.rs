//! Advisory nickname expansions. Nothing here edits a list.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::normalize::{title_case, NormalizedName};

const NICKNAMES: &[(&str, &str)] = &[
    ("mike", "Michael"),
    ("bob", "Robert"),
    ("joe", "Joseph"),
    ("tom", "Thomas"),
    ("bill", "William"),
    ("dave", "David"),
    ("steve", "Steven"),
    ("chris", "Christopher"),
];

static NICKNAME_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    NICKNAMES
        .iter()
        .map(|(short, full)| {
            let pattern = format!(r"(?i)\b{}\b", short);
            (Regex::new(&pattern).expect("valid regex"), *full)
        })
        .collect()
});

/// Suggested spellings keyed by the name they apply to.
///
/// Expansions accumulate: a name with two nicknames gets one suggestion per
/// expansion step (`"Mike Bob"` yields `"Michael Bob"` then
/// `"Michael Robert"`). Names without nicknames are absent from the map.
pub fn suggest_corrections(names: &[NormalizedName]) -> BTreeMap<String, Vec<String>> {
    let mut suggestions: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for name in names {
        let original = name.as_str();
        let mut candidate = original.to_lowercase();

        for (pattern, full) in NICKNAME_PATTERNS.iter() {
            if !pattern.is_match(&candidate) {
                continue;
            }
            candidate = title_case(&pattern.replace_all(&candidate, *full));
            if candidate != original {
                let entry = suggestions.entry(original.to_string()).or_default();
                if !entry.contains(&candidate) {
                    entry.push(candidate.clone());
                }
            }
        }
    }

    suggestions
}
