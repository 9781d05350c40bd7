//! In-memory document store
//!
//! Holds charity records as JSON documents and answers `count` / `find`
//! with the same filter, projection and sort semantics a document database
//! would. Used by the HTTP server, the CLI and the tests.

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde_json::Value;

use crate::query::{Filter, NormalizedQuery, ProjectionValue, SortOrder};

use super::errors::{StoreError, StoreResult};
use super::matcher::CompiledFilter;
use super::sorter::{project, ResultSorter, ScoredDocument};
use super::DocumentStore;

/// Shared, thread-safe document collection
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<Vec<Value>>>,
    text_fields: Vec<String>,
}

impl InMemoryStore {
    /// Empty store searching `text_fields` for `$text` clauses
    pub fn new(text_fields: Vec<String>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            text_fields,
        }
    }

    pub fn with_documents(text_fields: Vec<String>, documents: Vec<Value>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(documents)),
            text_fields,
        }
    }

    /// Load a JSON array of documents from disk
    pub fn load(path: &Path, text_fields: Vec<String>) -> StoreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Load(format!("{}: {}", path.display(), e)))?;

        let documents: Vec<Value> = serde_json::from_str(&content)
            .map_err(|e| StoreError::Load(format!("{}: {}", path.display(), e)))?;

        Ok(Self::with_documents(text_fields, documents))
    }

    pub fn insert(&self, document: Value) -> StoreResult<()> {
        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        documents.push(document);
        Ok(())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Value>>> {
        self.documents.read().map_err(|_| StoreError::Poisoned)
    }

    fn matching(&self, filter: &CompiledFilter) -> StoreResult<Vec<ScoredDocument>> {
        let documents = self.read()?;
        Ok(documents
            .iter()
            .filter_map(|doc| {
                filter
                    .evaluate(doc, &self.text_fields)
                    .map(|score| ScoredDocument {
                        document: doc.clone(),
                        score,
                    })
            })
            .collect())
    }
}

/// `$meta` entries only make sense when a `$text` clause produced scores
fn check_meta_usage(filter: &CompiledFilter, query: &NormalizedQuery) -> StoreResult<()> {
    if filter.has_text() {
        return Ok(());
    }

    let projects_meta = query
        .projection
        .iter()
        .any(|(_, value)| matches!(value, ProjectionValue::Meta(_)));
    let sorts_meta = query
        .sort
        .iter()
        .any(|(_, order)| matches!(order, SortOrder::Meta(_)));

    if projects_meta || sorts_meta {
        return Err(StoreError::invalid_operand(
            "$meta",
            "textScore requires a $text clause",
        ));
    }

    Ok(())
}

impl DocumentStore for InMemoryStore {
    type Error = StoreError;

    fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let compiled = CompiledFilter::compile(filter)?;
        Ok(self.matching(&compiled)?.len() as u64)
    }

    fn find(&self, query: &NormalizedQuery) -> StoreResult<Vec<Value>> {
        let compiled = CompiledFilter::compile(&query.filter)?;
        check_meta_usage(&compiled, query)?;

        let mut matched = self.matching(&compiled)?;
        ResultSorter::sort(&mut matched, &query.sort);

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        matched
            .iter()
            .skip(skip)
            .take(limit)
            .map(|scored| project(&scored.document, scored.score, &query.projection))
            .collect()
    }
}
