//! charitybase - query normalization service for charity register records
//!
//! Untrusted query-string parameters are parsed into a query descriptor,
//! normalized against an explicit policy (field redaction, compulsory
//! fields, full-text search, default ordering, pagination bounds) and
//! executed against a document store.

pub mod cli;
pub mod config;
pub mod http;
pub mod observability;
pub mod params;
pub mod query;
pub mod store;
