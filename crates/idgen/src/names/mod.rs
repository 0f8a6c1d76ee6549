//! Name cleaning and review.
//!
//! - [`normalize`]: one raw entry to a canonical [`NormalizedName`]
//! - [`analyze`]: validity and duplicate report over a batch
//! - [`CuratedList`]: the editable list handed to generation
//! - statistics and advisory nickname suggestions

mod analyze;
mod curate;
mod normalize;
mod stats;
mod suggest;

pub use analyze::{analyze, Analysis, DuplicateSummary, InvalidEntry, NameGroup};
pub use curate::{resolve_all, resolve_duplicates, CuratedList, CurationError, DuplicateChoice};
pub use normalize::{normalize, NormalizedName, Rejection};
pub use stats::NameStatistics;
pub use suggest::suggest_corrections;
