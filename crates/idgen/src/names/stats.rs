use serde::Serialize;

use super::normalize::NormalizedName;

/// Length and word-count summary of a list of names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameStatistics {
    pub total_names: usize,
    /// Characters, rounded to one decimal
    pub average_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub single_word_names: usize,
    pub multi_word_names: usize,
    pub longest_name: String,
    pub shortest_name: String,
}

impl NameStatistics {
    /// `None` for an empty list. Ties for longest/shortest go to the first
    /// name seen.
    pub fn compute(names: &[NormalizedName]) -> Option<Self> {
        let first = names.first()?;

        let mut total_chars = 0usize;
        let mut longest = first;
        let mut shortest = first;
        let mut single_word_names = 0;

        for name in names {
            let len = name.char_len();
            total_chars += len;
            if len > longest.char_len() {
                longest = name;
            }
            if len < shortest.char_len() {
                shortest = name;
            }
            if name.word_count() == 1 {
                single_word_names += 1;
            }
        }

        let average = total_chars as f64 / names.len() as f64;
        Some(Self {
            total_names: names.len(),
            average_length: (average * 10.0).round() / 10.0,
            min_length: shortest.char_len(),
            max_length: longest.char_len(),
            single_word_names,
            multi_word_names: names.len() - single_word_names,
            longest_name: longest.to_string(),
            shortest_name: shortest.to_string(),
        })
    }
}
