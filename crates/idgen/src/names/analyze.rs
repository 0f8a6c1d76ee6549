//! Validity and duplicate analysis over a batch of raw entries.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::normalize::{normalize, NormalizedName, Rejection};

/// A raw entry that failed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidEntry {
    pub raw: String,
    pub reason: Rejection,
}

/// A normalized value that occurs more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameGroup {
    pub name: NormalizedName,
    pub count: usize,
    /// 0-based indices into `Analysis::valid_names`
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSummary {
    pub has_duplicates: bool,
    pub duplicate_group_count: usize,
    pub duplicate_names: Vec<NormalizedName>,
    /// Entries belonging to any duplicate group, every occurrence counted
    pub total_duplicate_entries: usize,
}

/// Result of [`analyze`]. Recomputed from scratch on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Normalized names in input order, duplicates repeated
    pub valid_names: Vec<NormalizedName>,
    pub invalid: Vec<InvalidEntry>,
    /// Ordered by first occurrence
    pub groups: Vec<NameGroup>,
    /// Names that occur exactly once, in first-seen order
    pub unique_names: Vec<NormalizedName>,
}

impl Analysis {
    /// Raw text of every rejected entry, in input order.
    pub fn invalid_raw(&self) -> Vec<&str> {
        self.invalid.iter().map(|e| e.raw.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.valid_names.len()
    }

    pub fn unique_count(&self) -> usize {
        self.unique_names.len()
    }

    pub fn duplicate_group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    pub fn group(&self, name: &NormalizedName) -> Option<&NameGroup> {
        self.groups.iter().find(|g| &g.name == name)
    }

    pub fn duplicate_summary(&self) -> DuplicateSummary {
        DuplicateSummary {
            has_duplicates: !self.groups.is_empty(),
            duplicate_group_count: self.groups.len(),
            duplicate_names: self.groups.iter().map(|g| g.name.clone()).collect(),
            total_duplicate_entries: self.groups.iter().map(|g| g.count).sum(),
        }
    }
}

/// Normalize every raw entry and report validity and duplicates.
///
/// Rejected entries are collected, never fatal. The input is not modified.
pub fn analyze<S: AsRef<str>>(raw_entries: &[S]) -> Analysis {
    let mut valid_names = Vec::with_capacity(raw_entries.len());
    let mut invalid = Vec::new();

    for raw in raw_entries {
        let raw = raw.as_ref();
        match normalize(raw) {
            Ok(name) => valid_names.push(name),
            Err(reason) => invalid.push(InvalidEntry {
                raw: raw.to_string(),
                reason,
            }),
        }
    }

    let analysis = analyze_normalized(valid_names, invalid);
    debug!(
        "Analyzed {} entries: {} valid, {} invalid, {} duplicate groups",
        raw_entries.len(),
        analysis.total(),
        analysis.invalid_count(),
        analysis.duplicate_group_count()
    );
    analysis
}

/// Grouping pass over already-normalized names.
pub(crate) fn analyze_normalized(
    valid_names: Vec<NormalizedName>,
    invalid: Vec<InvalidEntry>,
) -> Analysis {
    // first-seen order of distinct names, with their positions
    let mut slots: HashMap<&NormalizedName, usize> = HashMap::with_capacity(valid_names.len());
    let mut seen: Vec<(&NormalizedName, Vec<usize>)> = Vec::new();

    for (pos, name) in valid_names.iter().enumerate() {
        match slots.get(name) {
            Some(&slot) => seen[slot].1.push(pos),
            None => {
                slots.insert(name, seen.len());
                seen.push((name, vec![pos]));
            }
        }
    }

    let mut groups = Vec::new();
    let mut unique_names = Vec::new();
    for (name, positions) in seen {
        if positions.len() == 1 {
            unique_names.push(name.clone());
        } else {
            groups.push(NameGroup {
                name: name.clone(),
                count: positions.len(),
                positions,
            });
        }
    }

    Analysis {
        valid_names,
        invalid,
        groups,
        unique_names,
    }
}
