use idgen_protocol::IdGenConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use crate::digest::HashSettings;
use crate::IdParseError;

/// Strategy names accepted from users and config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Hash,
    Sequential,
    Uuid,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Hash => "hash",
            StrategyKind::Sequential => "sequential",
            StrategyKind::Uuid => "uuid",
        }
    }

    /// Like `from_str`, but unknown names select content hashing.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            warn!("{}; using content hash", err);
            StrategyKind::Hash
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hash" | "content-hash" => Ok(StrategyKind::Hash),
            "sequential" | "seq" => Ok(StrategyKind::Sequential),
            "uuid" | "random" => Ok(StrategyKind::Uuid),
            other => Err(IdParseError::new(format!(
                "Unknown identifier strategy: '{}'",
                other
            ))),
        }
    }
}

/// Identifier strategy for one batch, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdStrategy {
    ContentHash(HashSettings),
    Sequential { prefix: String, width: usize },
    RandomUnique,
}

impl Default for IdStrategy {
    fn default() -> Self {
        IdStrategy::ContentHash(HashSettings::default())
    }
}

impl IdStrategy {
    pub fn sequential() -> Self {
        IdStrategy::Sequential {
            prefix: idgen_protocol::defaults::DEFAULT_SEQUENTIAL_PREFIX.to_string(),
            width: idgen_protocol::defaults::DEFAULT_SEQUENTIAL_WIDTH,
        }
    }

    /// Build the strategy for `kind` with parameters taken from `config`.
    pub fn from_config(kind: StrategyKind, config: &IdGenConfig) -> Self {
        match kind {
            StrategyKind::Hash => IdStrategy::ContentHash(HashSettings::from_config(config)),
            StrategyKind::Sequential => IdStrategy::Sequential {
                prefix: config.sequential_prefix.clone(),
                width: config.sequential_width,
            },
            StrategyKind::Uuid => IdStrategy::RandomUnique,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            IdStrategy::ContentHash(_) => StrategyKind::Hash,
            IdStrategy::Sequential { .. } => StrategyKind::Sequential,
            IdStrategy::RandomUnique => StrategyKind::Uuid,
        }
    }

    /// Whether re-running on the same input yields the same identifiers.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, IdStrategy::RandomUnique)
    }
}

/// `prefix` + 1-based `index` zero-padded to `width`, e.g. `ID001`.
pub fn sequential_id(index: usize, prefix: &str, width: usize) -> String {
    format!("{}{:0width$}", prefix, index, width = width)
}

/// Random 128-bit token rendered as 32 lowercase hex characters.
pub fn random_unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgen_protocol::HashAlgorithm;

    #[test]
    fn test_sequential_id_format() {
        assert_eq!(sequential_id(1, "ID", 3), "ID001");
        assert_eq!(sequential_id(42, "ID", 3), "ID042");
        assert_eq!(sequential_id(1000, "ID", 3), "ID1000");
        assert_eq!(sequential_id(7, "S-", 5), "S-00007");
    }

    #[test]
    fn test_random_unique_id_shape() {
        let a = random_unique_id();
        let b = random_unique_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!("HASH".parse::<StrategyKind>().unwrap(), StrategyKind::Hash);
        assert_eq!("random".parse::<StrategyKind>().unwrap(), StrategyKind::Uuid);
        assert!("base64".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::parse_lenient("base64"), StrategyKind::Hash);
        assert_eq!(StrategyKind::parse_lenient("sequential"), StrategyKind::Sequential);
    }

    #[test]
    fn test_strategy_from_config() {
        let config = IdGenConfig {
            hash_algorithm: "sha256".to_string(),
            sequential_prefix: "SUB".to_string(),
            sequential_width: 4,
            ..IdGenConfig::default()
        };

        match IdStrategy::from_config(StrategyKind::Hash, &config) {
            IdStrategy::ContentHash(settings) => {
                assert_eq!(settings.algorithm, HashAlgorithm::Sha256)
            }
            other => panic!("unexpected strategy {:?}", other),
        }
        assert_eq!(
            IdStrategy::from_config(StrategyKind::Sequential, &config),
            IdStrategy::Sequential {
                prefix: "SUB".to_string(),
                width: 4
            }
        );
        assert_eq!(
            IdStrategy::from_config(StrategyKind::Uuid, &config).kind(),
            StrategyKind::Uuid
        );
        assert!(!IdStrategy::RandomUnique.is_deterministic());
        assert!(IdStrategy::sequential().is_deterministic());
    }
}
