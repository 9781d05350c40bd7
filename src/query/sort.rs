//! Fallback sort order
//!
//! skip/limit pagination over an unordered result set is unsound, so a query
//! that reaches the store without a sort gets the configured key order.

use super::descriptor::{QueryDescriptor, Sort};

/// Supplies the default key order
pub struct SortDefaulter<'a> {
    keys: &'a [String],
}

impl<'a> SortDefaulter<'a> {
    pub fn new(keys: &'a [String]) -> Self {
        Self { keys }
    }

    /// `requested`, or ascending key order when nothing was requested
    pub fn resolve(&self, requested: Option<Sort>) -> Sort {
        requested.unwrap_or_else(|| Sort::ascending(self.keys.iter().cloned()))
    }

    /// Set ascending key order if no sort is present yet
    pub fn apply(&self, query: &mut QueryDescriptor) {
        query.sort = Some(self.resolve(query.sort.take()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys() -> Vec<String> {
        vec!["charityNumber".to_string(), "subNumber".to_string()]
    }

    #[test]
    fn test_unsorted_query_gets_key_order() {
        let keys = keys();
        let mut query = QueryDescriptor::default();

        SortDefaulter::new(&keys).apply(&mut query);

        assert_eq!(
            serde_json::to_string(&query.sort.unwrap()).unwrap(),
            r#"{"charityNumber":1,"subNumber":1}"#
        );
    }

    #[test]
    fn test_existing_sort_untouched() {
        let keys = keys();
        let mut query = QueryDescriptor {
            sort: Some(Sort::by_relevance()),
            ..Default::default()
        };

        SortDefaulter::new(&keys).apply(&mut query);

        assert_eq!(
            serde_json::to_value(query.sort.unwrap()).unwrap(),
            json!({"score": {"$meta": "textScore"}})
        );
    }
}
