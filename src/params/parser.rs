//! # Query Parameter Parser
//!
//! Turns raw `key=value` request parameters into a `QueryDescriptor`.
//!
//! Reserved keys:
//! - `fields=a,b,-c`  projection (`-` excludes)
//! - `sort=-a,b`      sort, in precedence order (`-` descends)
//! - `skip=n`, `limit=n`
//!
//! Every other parameter is a filter candidate written as
//! `[!]field[op]value`:
//!
//! | form            | clause                      |
//! |-----------------|-----------------------------|
//! | `field`         | `{$exists: true}`           |
//! | `!field`        | `{$exists: false}`          |
//! | `field=v`       | `v` (or `$regex` for `/re/i`) |
//! | `field=a,b`     | `{$in: [a, b]}`             |
//! | `field!=v`      | `{$ne: v}`                  |
//! | `field!=a,b`    | `{$nin: [a, b]}`            |
//! | `field>v` etc.  | `{$gt: v}` / `$gte` / `$lt` / `$lte` |
//!
//! Only whitelisted fields (exact path) become clauses. Parsing never fails:
//! anything malformed is dropped and left to the normalizer's defaults.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::query::{Projection, QueryDescriptor, Sort, SortOrder};

/// Projection parameter
pub const FIELDS_PARAM: &str = "fields";

/// Sort parameter
pub const SORT_PARAM: &str = "sort";

/// Offset parameter
pub const SKIP_PARAM: &str = "skip";

/// Page size parameter
pub const LIMIT_PARAM: &str = "limit";

/// Free-text search parameter, consumed by the normalizer rather than the filter
pub const SEARCH_PARAM: &str = "search";

/// Presence requests a total match count
pub const COUNT_PARAM: &str = "countResults";

fn expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(!?)([^><!=]+)(>=|<=|>|<|!=|=|)(.*)$").expect("static pattern compiles")
    })
}

fn regex_literal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^/(.*)/([imsx]*)$").expect("static pattern compiles"))
}

/// Parse raw parameters. Filter clauses are restricted to `whitelist`.
pub fn parse(raw: &[(String, String)], whitelist: &BTreeSet<String>) -> QueryDescriptor {
    let mut query = QueryDescriptor::default();

    for (key, value) in raw {
        match key.as_str() {
            FIELDS_PARAM => merge_projection(&mut query.projection, value),
            SORT_PARAM => {
                if let Some(sort) = parse_sort(value) {
                    query.sort = Some(sort);
                }
            }
            SKIP_PARAM => query.skip = parse_integer(value),
            LIMIT_PARAM => query.limit = parse_integer(value),
            _ => {
                if let Some((field, predicate)) = parse_filter(key, value) {
                    if whitelist.contains(&field) {
                        merge_clause(&mut query, field, predicate);
                    }
                }
            }
        }
    }

    query
}

/// The search term, if the request carries one
pub fn search_term(raw: &[(String, String)]) -> Option<&str> {
    raw.iter()
        .find(|(key, _)| key == SEARCH_PARAM)
        .map(|(_, value)| value.as_str())
}

/// Whether the request asks for a total match count (presence is enough)
pub fn wants_count(raw: &[(String, String)]) -> bool {
    raw.iter().any(|(key, _)| key == COUNT_PARAM)
}

/// Parse `a,b,-c` into include/exclude entries
fn merge_projection(projection: &mut Projection, value: &str) {
    for field in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        match field.strip_prefix('-') {
            Some(excluded) if !excluded.is_empty() => projection.exclude(excluded),
            Some(_) => {}
            None => projection.include(field.trim_start_matches('+')),
        }
    }
}

/// Parse `-a,b` into an ordered sort; `None` if nothing usable remains
fn parse_sort(value: &str) -> Option<Sort> {
    let mut sort = Sort::new();

    for part in value.split(',').map(str::trim) {
        let (field, order) = match part.strip_prefix('-') {
            Some(field) => (field, SortOrder::Descending),
            None => (part.trim_start_matches('+'), SortOrder::Ascending),
        };
        if !field.is_empty() {
            sort.push(field, order);
        }
    }

    if sort.is_empty() {
        None
    } else {
        Some(sort)
    }
}

/// Parse a signed integer; anything else counts as "not requested"
fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Parse one filter parameter into `(field, predicate)`
fn parse_filter(key: &str, value: &str) -> Option<(String, Value)> {
    let expression = if value.is_empty() {
        key.to_string()
    } else {
        format!("{}={}", key, value)
    };

    let captures = expression_pattern().captures(&expression)?;
    let negated = !captures[1].is_empty();
    let field = captures[2].trim().to_string();
    let operator = &captures[3];
    let operand = &captures[4];

    if field.is_empty() {
        return None;
    }

    let predicate = match (negated, operator) {
        (true, "") if operand.is_empty() => json!({ "$exists": false }),
        (false, "") if operand.is_empty() => json!({ "$exists": true }),
        (false, "=") => equality(operand),
        (false, "!=") => inequality(operand),
        (false, ">") => json!({ "$gt": cast_value(operand) }),
        (false, ">=") => json!({ "$gte": cast_value(operand) }),
        (false, "<") => json!({ "$lt": cast_value(operand) }),
        (false, "<=") => json!({ "$lte": cast_value(operand) }),
        _ => return None,
    };

    Some((field, predicate))
}

fn equality(operand: &str) -> Value {
    if let Some(regex) = regex_literal(operand) {
        return regex;
    }
    if operand.contains(',') {
        return json!({ "$in": cast_list(operand) });
    }
    cast_value(operand)
}

fn inequality(operand: &str) -> Value {
    if operand.contains(',') {
        return json!({ "$nin": cast_list(operand) });
    }
    json!({ "$ne": cast_value(operand) })
}

fn regex_literal(operand: &str) -> Option<Value> {
    let captures = regex_literal_pattern().captures(operand)?;
    let pattern = &captures[1];
    let options = &captures[2];

    Some(if options.is_empty() {
        json!({ "$regex": pattern })
    } else {
        json!({ "$regex": pattern, "$options": options })
    })
}

fn cast_list(operand: &str) -> Vec<Value> {
    operand.split(',').map(cast_value).collect()
}

/// Cast a raw value: numbers, booleans and `null` are typed, `string(x)`
/// forces a string, everything else stays a string.
pub fn cast_value(raw: &str) -> Value {
    if let Some(forced) = raw.strip_prefix("string(").and_then(|r| r.strip_suffix(')')) {
        return Value::String(forced.to_string());
    }

    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(f) {
            return Value::Number(num);
        }
    }

    Value::String(raw.to_string())
}

fn is_operator_object(value: &Value) -> Option<&Map<String, Value>> {
    value
        .as_object()
        .filter(|map| !map.is_empty() && map.keys().all(|k| k.starts_with('$')))
}

/// Combine operator clauses on the same field (`age>18&age<30`); anything
/// else replaces the earlier clause.
fn merge_clause(query: &mut QueryDescriptor, field: String, predicate: Value) {
    if let Some(existing) = query.filter.get_mut(&field) {
        if is_operator_object(existing).is_some() {
            if let (Value::Object(target), Some(incoming)) =
                (&mut *existing, is_operator_object(&predicate))
            {
                for (operator, operand) in incoming {
                    target.insert(operator.clone(), operand.clone());
                }
                return;
            }
        }
    }
    query.filter.insert(field, predicate);
}
