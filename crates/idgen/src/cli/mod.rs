//! CLI command implementations

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod output;

pub use error::HelpfulError;

use idgen::source::{self, Extraction, SourceLimits};
use idgen_protocol::{ConfigError, IdGenConfig};
use std::path::Path;

/// Resolve the configuration, turning failures into a helpful error.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<IdGenConfig> {
    IdGenConfig::resolve(explicit).map_err(|err| {
        let details = match &err {
            ConfigError::Io { source, .. } => source.to_string(),
            ConfigError::Parse { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        HelpfulError::invalid_config(explicit, &details).into()
    })
}

/// Extract names from `path` under the configured limits.
pub fn read_names(path: &Path, config: &IdGenConfig) -> anyhow::Result<Extraction> {
    source::extract(path, &SourceLimits::from_config(config))
        .map_err(|err| HelpfulError::from_source_error(path, &err).into())
}
