//! Full-text search integration
//!
//! A search term becomes a `$text` clause in which every whitespace-separated
//! token is quoted on its own. Quoted tokens are all required, so the store
//! performs an AND match over literal tokens.
//!
//! Double quotes in the input are stripped before tokenizing, which means
//! quoted phrases are NOT kept together: `foo "bar baz"` searches for `"foo"`,
//! `"bar"` and `"baz"` independently. This token-level AND is intentional.

use super::descriptor::{MetaClause, ProjectionValue, QueryDescriptor, Sort, SCORE_FIELD};

/// Build the AND-of-tokens search expression, or `None` when the term holds
/// no tokens once quotes are stripped.
pub fn quoted_tokens(term: &str) -> Option<String> {
    let unquoted = term.replace('"', "");
    let tokens: Vec<String> = unquoted
        .split_whitespace()
        .map(|token| format!("\"{}\"", token))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Folds a search term into filter, projection and sort
pub struct SearchIntegrator;

impl SearchIntegrator {
    /// Apply `term` to `query`. Absent or blank terms leave it untouched.
    ///
    /// Must run after projection sanitization: the score entry is synthetic
    /// and is not subject to privacy redaction. An explicitly requested sort
    /// is kept as is.
    pub fn apply(query: &mut QueryDescriptor, term: Option<&str>) -> bool {
        let Some(expression) = term.and_then(quoted_tokens) else {
            return false;
        };

        query.filter.set_text_search(expression);
        query
            .projection
            .insert(SCORE_FIELD, ProjectionValue::Meta(MetaClause::TextScore));

        if query.sort.is_none() {
            query.sort = Some(Sort::by_relevance());
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::descriptor::SortOrder;
    use serde_json::json;

    #[test]
    fn test_phrases_split_into_tokens() {
        assert_eq!(
            quoted_tokens("foo \"bar baz\"").as_deref(),
            Some("\"foo\" \"bar\" \"baz\"")
        );
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            quoted_tokens("  cancer\t research  ").as_deref(),
            Some("\"cancer\" \"research\"")
        );
    }

    #[test]
    fn test_quote_only_term_has_no_tokens() {
        assert_eq!(quoted_tokens("\"\""), None);
        assert_eq!(quoted_tokens("   "), None);
        assert_eq!(quoted_tokens(""), None);
    }

    #[test]
    fn test_apply_installs_clause_score_and_sort() {
        let mut query = QueryDescriptor::default();

        assert!(SearchIntegrator::apply(&mut query, Some("foo \"bar baz\"")));

        assert_eq!(
            serde_json::to_value(&query.filter).unwrap(),
            json!({"$text": {"$search": "\"foo\" \"bar\" \"baz\""}})
        );
        assert_eq!(
            query.projection.get(SCORE_FIELD),
            Some(&ProjectionValue::Meta(MetaClause::TextScore))
        );
        assert_eq!(query.sort, Some(Sort::by_relevance()));
    }

    #[test]
    fn test_apply_keeps_requested_sort() {
        let mut query = QueryDescriptor {
            sort: Some(Sort::ascending(["name"])),
            ..Default::default()
        };

        SearchIntegrator::apply(&mut query, Some("trust"));

        let sort = query.sort.unwrap();
        assert_eq!(sort.len(), 1);
        assert_eq!(sort.get("name"), Some(SortOrder::Ascending));
    }

    #[test]
    fn test_apply_without_term_is_noop() {
        let mut query = QueryDescriptor::default();

        assert!(!SearchIntegrator::apply(&mut query, None));
        assert!(!SearchIntegrator::apply(&mut query, Some("")));
        assert_eq!(query, QueryDescriptor::default());
    }
}
