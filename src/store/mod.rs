//! # Document Store
//!
//! The collaborator that executes normalized queries. The normalizer only
//! needs `count` and `find`; any backend offering those can sit behind the
//! `DocumentStore` trait.
//!
//! `InMemoryStore` is the bundled backend: it supports equality, `$ne`,
//! `$gt`/`$gte`/`$lt`/`$lte`, `$in`/`$nin`, `$exists`, `$regex` and `$text`
//! with a `textScore` relevance. Unknown operators are rejected as store
//! failures.

mod errors;
mod matcher;
mod memory;
mod sorter;
mod text;

pub use errors::{StoreError, StoreResult};
pub use matcher::{lookup, CompiledFilter};
pub use memory::InMemoryStore;
pub use sorter::{compare_values, ResultSorter, ScoredDocument};
pub use text::TextSearch;

use serde_json::Value;

use crate::query::{Filter, NormalizedQuery};

/// Executes normalized queries against a document collection
pub trait DocumentStore: Send + Sync {
    /// Store failure, surfaced to callers unchanged
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of documents matching `filter`
    fn count(&self, filter: &Filter) -> Result<u64, Self::Error>;

    /// One page of matching documents, sorted and projected
    fn find(&self, query: &NormalizedQuery) -> Result<Vec<Value>, Self::Error>;
}
