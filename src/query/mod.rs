//! # Query Normalization
//!
//! The decision logic of the service. A parsed request becomes a
//! `NormalizedQuery` that satisfies, by construction:
//!
//! - no private path (or descendant) in the projection, unless compulsory
//! - every compulsory path projected with `1`
//! - the identity field never projected
//! - no exclusion entries in the projection
//! - `0 < limit <= max_limit`, `skip >= 0`
//! - a `$text` clause and relevance sort when a search term was given
//!   (unless a sort was requested)
//! - the default key order when neither sort nor search was given

mod descriptor;
mod normalizer;
mod pagination;
mod path;
mod projection;
mod search;
mod sort;

pub use descriptor::{
    Filter, MetaClause, NormalizedQuery, Projection, ProjectionValue, QueryDescriptor, Sort,
    SortOrder, SCORE_FIELD, SEARCH_KEY, TEXT_KEY,
};
pub use normalizer::{QueryNormalizer, QueryOutcome};
pub use pagination::PaginationBounder;
pub use path::{is_descendant, is_descendant_of_any, is_private};
pub use projection::{retain_inclusions, ProjectionSanitizer};
pub use search::{quoted_tokens, SearchIntegrator};
pub use sort::SortDefaulter;
