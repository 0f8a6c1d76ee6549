//! Curated names to identifier records.
//!
//! One call is one run: a fresh [`IdAllocator`] is created, used for every
//! occurrence in input order, and dropped when the call returns.

use idgen_ids::{
    verify_uniqueness, AllocationStats, IdAllocator, IdStrategy, RunId, StrategyKind,
    UniquenessReport,
};
use idgen_protocol::IdentifierRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::names::NormalizedName;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("No names to process")]
    EmptyBatch,

    #[error("Batch of {count} names exceeds the limit of {limit}")]
    TooManyNames { count: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Output of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub run_id: RunId,
    pub strategy: StrategyKind,
    /// One record per input occurrence, in input order
    pub records: Vec<IdentifierRecord>,
    pub stats: AllocationStats,
    pub uniqueness: UniquenessReport,
}

/// Assign an identifier to every occurrence in `curated`.
///
/// Repeated names stay repeated. Under content hashing they share one
/// identifier; sequential and random strategies give each occurrence its own.
pub fn generate(curated: &[NormalizedName], strategy: &IdStrategy) -> Result<Generation> {
    if curated.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let run_id = RunId::new();
    let mut allocator = IdAllocator::new(strategy.clone());
    let records: Vec<IdentifierRecord> = curated
        .iter()
        .map(|name| IdentifierRecord::new(name.as_str(), allocator.allocate(name.as_str())))
        .collect();
    let stats = allocator.stats();

    let uniqueness = verify_uniqueness(&records);
    if !uniqueness.is_unique {
        warn!(
            run_id = %run_id,
            conflicts = uniqueness.conflicts.len(),
            "Generated identifiers are shared by different names"
        );
    }

    info!(
        run_id = %run_id,
        strategy = %strategy.kind(),
        records = records.len(),
        distinct_ids = uniqueness.distinct_ids,
        suffix_resolved = stats.suffix_resolved,
        random_fallbacks = stats.random_fallbacks,
        "Generated identifiers"
    );

    Ok(Generation {
        run_id,
        strategy: strategy.kind(),
        records,
        stats,
        uniqueness,
    })
}

/// [`generate`] with an upper bound on batch size.
pub fn generate_bounded(
    curated: &[NormalizedName],
    strategy: &IdStrategy,
    max_names: usize,
) -> Result<Generation> {
    if curated.len() > max_names {
        return Err(PipelineError::TooManyNames {
            count: curated.len(),
            limit: max_names,
        });
    }
    generate(curated, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::normalize;
    use idgen_ids::{content_hash, HashSettings};

    fn names(raw: &[&str]) -> Vec<NormalizedName> {
        raw.iter().map(|r| normalize(r).unwrap()).collect()
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(
            generate(&[], &IdStrategy::default()).unwrap_err(),
            PipelineError::EmptyBatch
        );
    }

    #[test]
    fn test_duplicates_share_hash_id() {
        let out = generate(&names(&["Ann", "ann", "Bob"]), &IdStrategy::default()).unwrap();
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].name, "Ann");
        assert_eq!(out.records[1].name, "Ann");
        assert_eq!(out.records[0].id, out.records[1].id);
        assert_ne!(out.records[0].id, out.records[2].id);
        assert_eq!(out.records[0].id, content_hash("Ann", &HashSettings::default()));
        assert!(out.uniqueness.is_unique);
        assert_eq!(out.stats.reused, 1);
    }

    #[test]
    fn test_sequential_numbers_every_occurrence() {
        let out = generate(&names(&["Ann", "Ann", "Bob"]), &IdStrategy::sequential()).unwrap();
        let ids: Vec<&str> = out.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["ID001", "ID002", "ID003"]);
        assert_eq!(out.strategy, StrategyKind::Sequential);
    }

    #[test]
    fn test_runs_are_independent() {
        let batch = names(&["Ann", "Bob"]);
        let first = generate(&batch, &IdStrategy::sequential()).unwrap();
        let second = generate(&batch, &IdStrategy::sequential()).unwrap();
        assert_eq!(first.records, second.records);
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_bounded() {
        let batch = names(&["Ann", "Bob", "Cy"]);
        assert_eq!(
            generate_bounded(&batch, &IdStrategy::default(), 2).unwrap_err(),
            PipelineError::TooManyNames { count: 3, limit: 2 }
        );
        assert!(generate_bounded(&batch, &IdStrategy::default(), 3).is_ok());
    }
}
