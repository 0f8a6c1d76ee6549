//! Post-generation checks over a finished record set.

use idgen_protocol::{HashAlgorithm, IdentifierRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::digest::{canonical_key, HashSettings};

/// An identifier shared by more than one distinct name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdConflict {
    pub id: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniquenessReport {
    pub is_unique: bool,
    pub total_records: usize,
    pub distinct_ids: usize,
    pub conflicts: Vec<IdConflict>,
}

/// Check that no identifier is shared by two different names.
///
/// Repeated occurrences of one name carrying the same identifier are not a
/// conflict; that is how content hashes treat duplicates.
pub fn verify_uniqueness(records: &[IdentifierRecord]) -> UniquenessReport {
    let mut owners: HashMap<&str, Vec<String>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for record in records {
        let names = owners.entry(record.id.as_str()).or_insert_with(|| {
            order.push(record.id.as_str());
            Vec::new()
        });
        let key = canonical_key(&record.name);
        if !names.iter().any(|n| canonical_key(n) == key) {
            names.push(record.name.clone());
        }
    }

    let conflicts: Vec<IdConflict> = order
        .iter()
        .filter_map(|id| {
            let names = &owners[id];
            (names.len() > 1).then(|| IdConflict {
                id: id.to_string(),
                names: names.clone(),
            })
        })
        .collect();

    UniquenessReport {
        is_unique: conflicts.is_empty(),
        total_records: records.len(),
        distinct_ids: owners.len(),
        conflicts,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashStatistics {
    pub total_hashes: usize,
    pub unique_hashes: usize,
    pub average_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub algorithm: HashAlgorithm,
    pub salt_enabled: bool,
}

/// Summary of generated identifiers; `None` for an empty slice.
pub fn hash_statistics<S: AsRef<str>>(
    ids: &[S],
    settings: &HashSettings,
) -> Option<HashStatistics> {
    if ids.is_empty() {
        return None;
    }

    let lengths: Vec<usize> = ids.iter().map(|id| id.as_ref().chars().count()).collect();
    let unique: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();

    Some(HashStatistics {
        total_hashes: ids.len(),
        unique_hashes: unique.len(),
        average_length: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        algorithm: settings.algorithm,
        salt_enabled: settings.salt_enabled(),
    })
}
