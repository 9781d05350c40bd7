//! `$text` evaluation
//!
//! Search expressions follow the document-store convention: quoted phrases
//! are all required, bare terms match if any one of them is present. When a
//! phrase is present, bare terms only contribute to the score.
//!
//! Scoring is term-frequency saturation summed over phrases and terms,
//! case-insensitive, over the configured text fields.

use serde_json::Value;

use super::matcher::lookup;

const K1: f64 = 1.2;

/// Parsed search expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    phrases: Vec<String>,
    terms: Vec<String>,
}

impl TextSearch {
    pub fn parse(expression: &str) -> Self {
        let mut phrases = Vec::new();
        let mut terms = Vec::new();

        // Segments at odd positions sit between quotes
        for (i, segment) in expression.split('"').enumerate() {
            if i % 2 == 1 {
                let phrase = segment.trim().to_lowercase();
                if !phrase.is_empty() {
                    phrases.push(phrase);
                }
            } else {
                terms.extend(segment.split_whitespace().map(str::to_lowercase));
            }
        }

        Self { phrases, terms }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Relevance score, or `None` when the document does not match
    pub fn score(&self, document: &Value, text_fields: &[String]) -> Option<f64> {
        if self.phrases.is_empty() && self.terms.is_empty() {
            return None;
        }

        let haystack = text_fields
            .iter()
            .filter_map(|field| lookup(document, field).and_then(Value::as_str))
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        let phrase_hits: Vec<usize> = self
            .phrases
            .iter()
            .map(|p| haystack.matches(p.as_str()).count())
            .collect();
        if phrase_hits.iter().any(|&hits| hits == 0) {
            return None;
        }

        let words: Vec<&str> = haystack
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let term_hits: Vec<usize> = self
            .terms
            .iter()
            .map(|t| words.iter().filter(|w| **w == t.as_str()).count())
            .collect();
        if self.phrases.is_empty() && term_hits.iter().all(|&hits| hits == 0) {
            return None;
        }

        let score = phrase_hits
            .into_iter()
            .chain(term_hits)
            .map(saturate)
            .sum();
        Some(score)
    }
}

fn saturate(hits: usize) -> f64 {
    let tf = hits as f64;
    tf * (K1 + 1.0) / (tf + K1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<String> {
        vec!["name".to_string()]
    }

    #[test]
    fn test_parse_phrases_and_terms() {
        let search = TextSearch::parse("\"Cancer\" research \"uk\"");
        assert_eq!(search.phrases(), ["cancer", "uk"]);
        assert_eq!(search.terms(), ["research"]);
    }

    #[test]
    fn test_all_phrases_required() {
        let search = TextSearch::parse("\"cancer\" \"research\"");

        assert!(search
            .score(&json!({"name": "Cancer Research UK"}), &fields())
            .is_some());
        assert!(search
            .score(&json!({"name": "Cancer Relief"}), &fields())
            .is_none());
    }

    #[test]
    fn test_any_term_suffices() {
        let search = TextSearch::parse("cancer heart");

        assert!(search
            .score(&json!({"name": "British Heart Foundation"}), &fields())
            .is_some());
        assert!(search
            .score(&json!({"name": "Oxfam"}), &fields())
            .is_none());
    }

    #[test]
    fn test_more_hits_score_higher() {
        let search = TextSearch::parse("\"trust\"");
        let once = search.score(&json!({"name": "Wellcome Trust"}), &fields()).unwrap();
        let twice = search
            .score(&json!({"name": "Trust for the Trust"}), &fields())
            .unwrap();
        assert!(twice > once);
    }

    #[test]
    fn test_empty_expression_matches_nothing() {
        let search = TextSearch::parse("\"\"");
        assert!(search.score(&json!({"name": "x"}), &fields()).is_none());
    }
}
