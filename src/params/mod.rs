//! # Request Parameters
//!
//! Parses untrusted query-string parameters into a `QueryDescriptor`.
//! The parser only decides *shape*; safety (redaction, bounds, defaults) is
//! the normalizer's job.

mod parser;

pub use parser::{
    cast_value, parse, search_term, wants_count, COUNT_PARAM, FIELDS_PARAM, LIMIT_PARAM,
    SEARCH_PARAM, SKIP_PARAM, SORT_PARAM,
};
