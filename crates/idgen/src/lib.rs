//! idgen - name lists to participant identifiers
//!
//! The library side of the `idgen` binary:
//! - [`source`]: read raw names from TXT, CSV and XLSX files
//! - [`names`]: normalize, analyze and curate them
//! - [`pipeline`]: assign identifiers with an [`idgen_ids::IdStrategy`]
//!
//! Exporting is done by [`idgen_sinks`], re-exported as [`sinks`].

pub mod names;
pub mod pipeline;
pub mod source;

pub use idgen_ids as ids;
pub use idgen_protocol as protocol;
pub use idgen_sinks as sinks;

pub use names::{analyze, normalize, Analysis, CuratedList, DuplicateChoice, NormalizedName};
pub use pipeline::{generate, Generation, PipelineError};
pub use source::{extract, Extraction, SourceError, SourceLimits};
