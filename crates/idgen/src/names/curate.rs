//! Editable, order-preserving list of names headed for generation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::analyze::{analyze_normalized, Analysis};
use super::normalize::{normalize, NormalizedName, Rejection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurationError {
    #[error("'{raw}' is not a valid name: {reason}")]
    Rejected { raw: String, reason: Rejection },

    #[error("index {index} out of range for list of {len} names")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, CurationError>;

/// Names in the order they will be numbered and exported.
///
/// Holds no derived counters; call [`CuratedList::analyze`] for a fresh
/// report after editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CuratedList {
    names: Vec<NormalizedName>,
}

impl CuratedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<NormalizedName>) -> Self {
        Self { names }
    }

    /// Every valid name of an analysis, duplicates included.
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self::from_names(analysis.valid_names.clone())
    }

    pub fn names(&self) -> &[NormalizedName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn push(&mut self, raw: &str) -> Result<&NormalizedName> {
        let name = accept(raw)?;
        self.names.push(name);
        Ok(&self.names[self.names.len() - 1])
    }

    pub fn insert(&mut self, index: usize, raw: &str) -> Result<&NormalizedName> {
        if index > self.names.len() {
            return Err(self.out_of_range(index));
        }
        let name = accept(raw)?;
        self.names.insert(index, name);
        Ok(&self.names[index])
    }

    /// Replace the name at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, raw: &str) -> Result<NormalizedName> {
        if index >= self.names.len() {
            return Err(self.out_of_range(index));
        }
        let name = accept(raw)?;
        Ok(std::mem::replace(&mut self.names[index], name))
    }

    pub fn remove(&mut self, index: usize) -> Result<NormalizedName> {
        if index >= self.names.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.names.remove(index))
    }

    /// Immutable copy for analysis or generation; later edits do not affect it.
    pub fn snapshot(&self) -> Arc<[NormalizedName]> {
        Arc::from(self.names.as_slice())
    }

    pub fn analyze(&self) -> Analysis {
        analyze_normalized(self.snapshot().to_vec(), Vec::new())
    }

    pub fn into_names(self) -> Vec<NormalizedName> {
        self.names
    }

    fn out_of_range(&self, index: usize) -> CurationError {
        CurationError::IndexOutOfRange {
            index,
            len: self.names.len(),
        }
    }
}

fn accept(raw: &str) -> Result<NormalizedName> {
    normalize(raw).map_err(|reason| CurationError::Rejected {
        raw: raw.to_string(),
        reason,
    })
}

/// What to do with the occurrences of one duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateChoice {
    #[default]
    KeepAll,
    /// First occurrence only
    KeepOne,
    RemoveAll,
}

impl DuplicateChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateChoice::KeepAll => "keep-all",
            DuplicateChoice::KeepOne => "keep-one",
            DuplicateChoice::RemoveAll => "remove-all",
        }
    }
}

impl fmt::Display for DuplicateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "keep-all" | "all" => Ok(DuplicateChoice::KeepAll),
            "keep-one" | "one" | "first" => Ok(DuplicateChoice::KeepOne),
            "remove-all" | "remove" | "none" => Ok(DuplicateChoice::RemoveAll),
            other => Err(format!(
                "Unknown duplicate choice '{}' (expected keep-all, keep-one or remove-all)",
                other
            )),
        }
    }
}

/// Apply per-group choices to an analysis.
///
/// Groups without an entry in `choices` keep every occurrence. Surviving
/// names keep their relative order.
pub fn resolve_duplicates(
    analysis: &Analysis,
    choices: &HashMap<NormalizedName, DuplicateChoice>,
) -> CuratedList {
    let mut dropped = vec![false; analysis.valid_names.len()];
    for group in &analysis.groups {
        let choice = choices.get(&group.name).copied().unwrap_or_default();
        let skip = match choice {
            DuplicateChoice::KeepAll => continue,
            DuplicateChoice::KeepOne => 1,
            DuplicateChoice::RemoveAll => 0,
        };
        for &pos in group.positions.iter().skip(skip) {
            dropped[pos] = true;
        }
    }

    let names: Vec<NormalizedName> = analysis
        .valid_names
        .iter()
        .zip(&dropped)
        .filter(|(_, gone)| !**gone)
        .map(|(name, _)| name.clone())
        .collect();

    debug!(
        "Resolved duplicates: {} of {} names kept",
        names.len(),
        analysis.valid_names.len()
    );
    CuratedList::from_names(names)
}

/// Apply one choice to every duplicate group.
pub fn resolve_all(analysis: &Analysis, choice: DuplicateChoice) -> CuratedList {
    let choices = analysis
        .groups
        .iter()
        .map(|g| (g.name.clone(), choice))
        .collect();
    resolve_duplicates(analysis, &choices)
}
