//! Identifier strategies for idgen.
//!
//! Three strategies are supported, selected once per batch through
//! [`IdStrategy`]:
//! - content hash of the canonical name (md5, sha1, sha256, blake3), with
//!   suffix-rehash collision avoidance
//! - sequential codes (`ID001`, `ID002`, ...)
//! - random 128-bit tokens
//!
//! All per-run state lives in an [`IdAllocator`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

mod allocator;
mod cache;
mod digest;
mod strategy;
mod verify;

pub use allocator::{AllocationStats, IdAllocator};
pub use cache::HashCache;
pub use digest::{
    canonical_key, content_hash, digest_hex, hash_input, resolve_algorithm, HashSettings,
};
pub use strategy::{random_unique_id, sequential_id, IdStrategy, StrategyKind};
pub use verify::{hash_statistics, verify_uniqueness, HashStatistics, IdConflict, UniquenessReport};

/// Error returned when parsing an identifier or strategy name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

macro_rules! define_uuid_id {
    ($name:ident, $label:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(value)
                    .map_err(|e| IdParseError::new(format!("Invalid {}: {}", $label, e)))?;
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

// Correlates log lines of one generation run.
define_uuid_id!(RunId, "run ID");
