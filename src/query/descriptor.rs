//! # Query Descriptor
//!
//! The filter / projection / sort / pagination bundle threaded through
//! normalization, and the fully specified form handed to the store.
//!
//! All types serialize to the document-store query language: projections as
//! `{path: 1}`, sorts as an ordered `{path: 1 | -1}` map, and relevance
//! entries as `{"$meta": "textScore"}`.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Synthetic field carrying the full-text relevance score
pub const SCORE_FIELD: &str = "score";

/// Filter key holding the full-text clause
pub const TEXT_KEY: &str = "$text";

/// Key of the search expression inside the full-text clause
pub const SEARCH_KEY: &str = "$search";

/// Store-computed metadata that can be projected or sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaClause {
    /// Full-text match quality
    TextScore,
}

impl MetaClause {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaClause::TextScore => "textScore",
        }
    }

    /// Parse a `{"$meta": "..."}` clause
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.get("$meta").and_then(Value::as_str) {
            Some("textScore") => Some(MetaClause::TextScore),
            _ => None,
        }
    }

    pub fn to_value(self) -> Value {
        json!({ "$meta": self.as_str() })
    }
}

impl Serialize for MetaClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$meta", self.as_str())?;
        map.end()
    }
}

// ==================
// Filter
// ==================

/// Filter predicate: field path to value or operator expression.
///
/// Keys are unique and unordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clause for a field path, replacing any previous one
    pub fn insert(&mut self, path: impl Into<String>, predicate: Value) {
        self.0.insert(path.into(), predicate);
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        self.0.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Install a full-text search expression
    pub fn set_text_search(&mut self, expression: impl Into<String>) {
        let mut clause = Map::new();
        clause.insert(SEARCH_KEY.to_string(), Value::String(expression.into()));
        self.0.insert(TEXT_KEY.to_string(), Value::Object(clause));
    }

    /// The full-text search expression, if one is installed
    pub fn text_search(&self) -> Option<&str> {
        self.0
            .get(TEXT_KEY)
            .and_then(|clause| clause.get(SEARCH_KEY))
            .and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ==================
// Projection
// ==================

/// A single projection entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionValue {
    /// `1`
    Include,
    /// `0`
    Exclude,
    /// Store-computed metadata
    Meta(MetaClause),
}

impl ProjectionValue {
    /// Only a plain `1` counts as an inclusion request
    pub fn is_include(&self) -> bool {
        matches!(self, ProjectionValue::Include)
    }

    /// Read a raw projection value. `1` includes, a `$meta` clause projects
    /// metadata, anything else is treated as an exclusion.
    pub fn from_value(value: &Value) -> Self {
        if value.as_i64() == Some(1) {
            return ProjectionValue::Include;
        }
        match MetaClause::from_value(value) {
            Some(meta) => ProjectionValue::Meta(meta),
            None => ProjectionValue::Exclude,
        }
    }
}

impl Serialize for ProjectionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProjectionValue::Include => serializer.serialize_i64(1),
            ProjectionValue::Exclude => serializer.serialize_i64(0),
            ProjectionValue::Meta(meta) => meta.serialize(serializer),
        }
    }
}

/// Field path to projection entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Projection(BTreeMap<String, ProjectionValue>);

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(&mut self, path: impl Into<String>) {
        self.0.insert(path.into(), ProjectionValue::Include);
    }

    pub fn exclude(&mut self, path: impl Into<String>) {
        self.0.insert(path.into(), ProjectionValue::Exclude);
    }

    pub fn insert(&mut self, path: impl Into<String>, value: ProjectionValue) {
        self.0.insert(path.into(), value);
    }

    pub fn remove(&mut self, path: &str) -> Option<ProjectionValue> {
        self.0.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&ProjectionValue> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &ProjectionValue) -> bool,
    {
        self.0.retain(|path, value| keep(path, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProjectionValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ProjectionValue)> for Projection {
    fn from_iter<I: IntoIterator<Item = (K, ProjectionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ==================
// Sort
// ==================

/// Direction of one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
    Meta(MetaClause),
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SortOrder::Ascending => serializer.serialize_i64(1),
            SortOrder::Descending => serializer.serialize_i64(-1),
            SortOrder::Meta(meta) => meta.serialize(serializer),
        }
    }
}

/// Ordered sort keys; earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort(Vec<(String, SortOrder)>);

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ascending order over `paths`, in the given precedence
    pub fn ascending<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sort = Sort::new();
        for path in paths {
            sort.push(path, SortOrder::Ascending);
        }
        sort
    }

    /// Descending relevance order
    pub fn by_relevance() -> Self {
        let mut sort = Sort::new();
        sort.push(SCORE_FIELD, SortOrder::Meta(MetaClause::TextScore));
        sort
    }

    /// Append a key. A path already present keeps its position and takes
    /// the new order.
    pub fn push(&mut self, path: impl Into<String>, order: SortOrder) {
        let path = path.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == path) {
            Some(entry) => entry.1 = order,
            None => self.0.push((path, order)),
        }
    }

    pub fn get(&self, path: &str) -> Option<SortOrder> {
        self.0
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, order)| *order)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.0.iter().map(|(path, order)| (path.as_str(), *order))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Sort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, order) in &self.0 {
            map.serialize_entry(path, order)?;
        }
        map.end()
    }
}

// ==================
// Descriptors
// ==================

/// In-flight query. Unset pagination and sort mean "not requested".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: Option<Sort>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Fully specified query, ready for the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: Sort,
    pub skip: u64,
    pub limit: u64,
}

impl From<NormalizedQuery> for QueryDescriptor {
    fn from(query: NormalizedQuery) -> Self {
        Self {
            filter: query.filter,
            projection: query.projection,
            sort: Some(query.sort),
            skip: i64::try_from(query.skip).ok(),
            limit: i64::try_from(query.limit).ok(),
        }
    }
}
