//! Filter evaluation
//!
//! A `Filter` is compiled once per store call so that malformed operators
//! and patterns are rejected up front, even when no document would reach
//! them.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::query::{Filter, SEARCH_KEY, TEXT_KEY};

use super::errors::{StoreError, StoreResult};
use super::text::TextSearch;

/// Resolve a dotted path inside a document
pub fn lookup<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

#[derive(Debug)]
enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    Regex(Regex),
}

#[derive(Debug)]
struct FieldClause {
    path: String,
    conditions: Vec<Condition>,
}

/// A filter ready to run against documents
#[derive(Debug)]
pub struct CompiledFilter {
    fields: Vec<FieldClause>,
    text: Option<TextSearch>,
}

impl CompiledFilter {
    pub fn compile(filter: &Filter) -> StoreResult<Self> {
        let mut fields = Vec::with_capacity(filter.len());
        let mut text = None;

        for (key, predicate) in filter.iter() {
            if key == TEXT_KEY {
                let expression = predicate
                    .get(SEARCH_KEY)
                    .and_then(Value::as_str)
                    .ok_or_else(|| StoreError::invalid_operand(TEXT_KEY, "missing $search string"))?;
                text = Some(TextSearch::parse(expression));
            } else if key.starts_with('$') {
                return Err(StoreError::UnsupportedOperator(key.clone()));
            } else {
                fields.push(FieldClause {
                    path: key.clone(),
                    conditions: compile_predicate(predicate)?,
                });
            }
        }

        Ok(Self { fields, text })
    }

    /// Whether a `$text` clause is present (and so a relevance score exists)
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// `None` if the document does not match; otherwise its relevance score
    /// (0.0 when there is no `$text` clause).
    pub fn evaluate(&self, document: &Value, text_fields: &[String]) -> Option<f64> {
        let fields_match = self.fields.iter().all(|clause| {
            let actual = lookup(document, &clause.path);
            clause
                .conditions
                .iter()
                .all(|condition| condition_matches(actual, condition))
        });

        if !fields_match {
            return None;
        }

        match &self.text {
            Some(search) => search.score(document, text_fields),
            None => Some(0.0),
        }
    }
}

fn is_operator_object(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn compile_predicate(predicate: &Value) -> StoreResult<Vec<Condition>> {
    let operators = match predicate {
        Value::Object(map) if is_operator_object(map) => map,
        other => return Ok(vec![Condition::Eq(other.clone())]),
    };

    let mut conditions = Vec::with_capacity(operators.len());
    for (operator, operand) in operators {
        let condition = match operator.as_str() {
            "$eq" => Condition::Eq(operand.clone()),
            "$ne" => Condition::Ne(operand.clone()),
            "$gt" => Condition::Gt(operand.clone()),
            "$gte" => Condition::Gte(operand.clone()),
            "$lt" => Condition::Lt(operand.clone()),
            "$lte" => Condition::Lte(operand.clone()),
            "$in" => Condition::In(array_operand(operator, operand)?),
            "$nin" => Condition::Nin(array_operand(operator, operand)?),
            "$exists" => Condition::Exists(truthy(operand)),
            "$regex" => {
                let options = operators.get("$options").and_then(Value::as_str);
                Condition::Regex(compile_regex(operand, options)?)
            }
            "$options" => continue,
            _ => return Err(StoreError::UnsupportedOperator(operator.clone())),
        };
        conditions.push(condition);
    }

    Ok(conditions)
}

fn array_operand(operator: &str, operand: &Value) -> StoreResult<Vec<Value>> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| StoreError::invalid_operand(operator, "expected an array"))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        _ => true,
    }
}

fn compile_regex(pattern: &Value, options: Option<&str>) -> StoreResult<Regex> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| StoreError::invalid_operand("$regex", "expected a string"))?;

    let mut builder = RegexBuilder::new(pattern);
    for flag in options.unwrap_or("").chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                return Err(StoreError::invalid_operand(
                    "$options",
                    format!("unknown flag '{}'", other),
                ))
            }
        };
    }

    builder
        .build()
        .map_err(|e| StoreError::InvalidRegex(e.to_string()))
}

/// Equality with numeric normalization (`1` equals `1.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between values of the same type class; `None` across classes
fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Apply `test` to the value, or to each element when the value is an array
fn any_element<F>(actual: &Value, test: F) -> bool
where
    F: Fn(&Value) -> bool,
{
    match actual {
        Value::Array(items) => test(actual) || items.iter().any(test),
        _ => test(actual),
    }
}

fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(value) => any_element(value, |v| values_equal(v, expected)),
    }
}

fn compares(actual: Option<&Value>, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    actual.is_some_and(|value| {
        any_element(value, |v| compare_same_type(v, bound).is_some_and(accept))
    })
}

fn condition_matches(actual: Option<&Value>, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(expected) => equals(actual, expected),
        Condition::Ne(expected) => !equals(actual, expected),
        Condition::Gt(bound) => compares(actual, bound, Ordering::is_gt),
        Condition::Gte(bound) => compares(actual, bound, Ordering::is_ge),
        Condition::Lt(bound) => compares(actual, bound, Ordering::is_lt),
        Condition::Lte(bound) => compares(actual, bound, Ordering::is_le),
        Condition::In(candidates) => candidates.iter().any(|c| equals(actual, c)),
        Condition::Nin(candidates) => !candidates.iter().any(|c| equals(actual, c)),
        Condition::Exists(expected) => actual.is_some() == *expected,
        Condition::Regex(regex) => actual.is_some_and(|value| {
            any_element(value, |v| v.as_str().is_some_and(|s| regex.is_match(s)))
        }),
    }
}
