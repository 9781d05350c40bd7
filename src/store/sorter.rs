//! Result ordering and projection for the in-memory store

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::query::{Projection, ProjectionValue, Sort, SortOrder};

use super::errors::{StoreError, StoreResult};
use super::matcher::lookup;

/// A matched document with its relevance score
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Value,
    pub score: f64,
}

/// Sorts scored documents
pub struct ResultSorter;

impl ResultSorter {
    /// Multi-key stable sort. Earlier keys take precedence; `$meta` keys
    /// order by descending relevance.
    pub fn sort(documents: &mut [ScoredDocument], sort: &Sort) {
        documents.sort_by(|a, b| {
            for (path, order) in sort.iter() {
                let ordering = match order {
                    SortOrder::Ascending => {
                        compare_values(lookup(&a.document, path), lookup(&b.document, path))
                    }
                    SortOrder::Descending => {
                        compare_values(lookup(&a.document, path), lookup(&b.document, path))
                            .reverse()
                    }
                    SortOrder::Meta(_) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

/// Compares two JSON values for sorting.
///
/// Ordering rules:
/// - missing < null < bool < number < string < array < object
/// - for same types, natural ordering
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let type_order = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let by_type = type_order(a_val).cmp(&type_order(b_val));
            if by_type != Ordering::Equal {
                return by_type;
            }

            match (a_val, b_val) {
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                (Value::Number(x), Value::Number(y)) => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
                (Value::String(x), Value::String(y)) => x.cmp(y),
                _ => Ordering::Equal,
            }
        }
    }
}

/// Builds the projected form of a document.
///
/// Projections are inclusion-only: unlisted fields, the identity field
/// included, are never returned.
pub fn project(document: &Value, score: f64, projection: &Projection) -> StoreResult<Value> {
    let mut out = Map::new();

    for (path, value) in projection.iter() {
        match value {
            ProjectionValue::Include => {
                if let Some(found) = lookup(document, path) {
                    insert_path(&mut out, path, found.clone());
                }
            }
            ProjectionValue::Meta(_) => {
                let score = serde_json::Number::from_f64(score)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                insert_path(&mut out, path, score);
            }
            ProjectionValue::Exclude => return Err(StoreError::MixedProjection),
        }
    }

    Ok(Value::Object(out))
}

fn insert_path(out: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}
