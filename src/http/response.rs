//! # Response Envelope

use serde::Serialize;
use serde_json::Value;

use crate::query::{NormalizedQuery, QueryOutcome};

/// Body of a successful `/charities` request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharitiesResponse {
    pub version: String,
    /// `null` unless `countResults` was passed
    pub total_matches: Option<u64>,
    pub query: NormalizedQuery,
    pub charities: Vec<Value>,
}

impl CharitiesResponse {
    pub fn new(version: impl Into<String>, outcome: QueryOutcome) -> Self {
        Self {
            version: version.into(),
            total_matches: outcome.total_matches,
            query: outcome.query,
            charities: outcome.records,
        }
    }
}
