//! Shared vocabulary for idgen.
//!
//! Types here cross crate boundaries: the identifier generator produces
//! [`IdentifierRecord`]s, the sinks consume them, and every crate reads the
//! same [`IdGenConfig`] and defaults.

pub mod config;
pub mod defaults;
pub mod paths;
pub mod types;

pub use config::{ConfigError, IdGenConfig};
pub use paths::{default_config_path, default_logs_dir, idgen_home};
pub use types::{ExportFormat, HashAlgorithm, IdentifierRecord};
