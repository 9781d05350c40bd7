//! # Query Normalizer
//!
//! Turns untrusted request parameters into a bounded, fully specified query
//! and runs it against a document store.
//!
//! # Pipeline (strict order)
//!
//! 1. Parse raw parameters (whitelisted filter fields only)
//! 2. Sanitize the projection
//! 3. Fold in the search term
//! 4. Default the sort
//! 5. Bound skip and limit
//!
//! Sanitization precedes search so that the synthetic score entry is never
//! redacted, and so compulsory fields cannot be excluded again afterwards.
//! None of these steps can fail; only the store can.

use serde::Serialize;
use serde_json::Value;

use crate::config::{ConfigResult, QueryConfig};
use crate::observability::{log_event_with_fields, Event};
use crate::params;
use crate::store::DocumentStore;

use super::descriptor::{NormalizedQuery, QueryDescriptor};
use super::pagination::PaginationBounder;
use super::projection::ProjectionSanitizer;
use super::search::SearchIntegrator;
use super::sort::SortDefaulter;

/// Result of running a normalized query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    /// The query as executed
    pub query: NormalizedQuery,
    /// Total matches for the filter; `None` unless a count was requested
    pub total_matches: Option<u64>,
    /// The requested page
    pub records: Vec<Value>,
}

/// Applies one field policy to every request
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    config: QueryConfig,
}

impl QueryNormalizer {
    /// Fix the policy for this normalizer. Rejects inconsistent policies
    /// (zero default limit, max below default, compulsory identity).
    pub fn new(config: QueryConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Parse raw `(key, value)` parameters under this policy's whitelist
    pub fn parse(&self, raw: &[(String, String)]) -> QueryDescriptor {
        params::parse(raw, &self.config.whitelist)
    }

    /// Normalize a parsed query. Total: never fails.
    pub fn normalize(&self, mut query: QueryDescriptor, search: Option<&str>) -> NormalizedQuery {
        query.projection = ProjectionSanitizer::new(&self.config).sanitize(&query.projection);

        let searched = SearchIntegrator::apply(&mut query, search);

        let sort = SortDefaulter::new(&self.config.default_sort).resolve(query.sort);

        let bounder = PaginationBounder::new(self.config.default_limit, self.config.max_limit);
        let normalized = NormalizedQuery {
            filter: query.filter,
            projection: query.projection,
            sort,
            skip: bounder.skip(query.skip),
            limit: bounder.limit(query.limit),
        };

        let clauses = normalized.filter.len().to_string();
        let projected = normalized.projection.len().to_string();
        let skip = normalized.skip.to_string();
        let limit = normalized.limit.to_string();
        log_event_with_fields(
            Event::QueryNormalized,
            &[
                ("filter_clauses", clauses.as_str()),
                ("limit", limit.as_str()),
                ("projected", projected.as_str()),
                ("search", if searched { "true" } else { "false" }),
                ("skip", skip.as_str()),
            ],
        );

        normalized
    }

    /// Parse, normalize and execute one request.
    ///
    /// With `want_count`, the total is resolved first from the filter alone;
    /// the page is then fetched with the same, unmodified filter. Store
    /// errors are returned exactly as the store produced them.
    pub fn normalize_and_execute<S: DocumentStore>(
        &self,
        store: &S,
        raw: &[(String, String)],
        search: Option<&str>,
        want_count: bool,
    ) -> Result<QueryOutcome, S::Error> {
        let query = self.normalize(self.parse(raw), search);

        let total_matches = if want_count {
            Some(store.count(&query.filter).inspect_err(log_store_failure)?)
        } else {
            None
        };

        let records = store.find(&query).inspect_err(log_store_failure)?;

        let returned = records.len().to_string();
        let total = total_matches.map_or_else(|| "null".to_string(), |n| n.to_string());
        log_event_with_fields(
            Event::QueryExecuted,
            &[("records", returned.as_str()), ("total_matches", total.as_str())],
        );

        Ok(QueryOutcome {
            query,
            total_matches,
            records,
        })
    }
}

fn log_store_failure<E: std::fmt::Display>(error: &E) {
    let message = error.to_string();
    log_event_with_fields(Event::StoreFailed, &[("error", message.as_str())]);
}
