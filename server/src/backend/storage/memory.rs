//! In-memory document store.
//!
//! Evaluates [`DocumentQuery`] filters, ordering and limits over documents
//! held in a map. Used by the test suite and by `DATA_BACKEND=memory` for
//! local development without cloud credentials.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::backend::storage::document::{
    compare_values, Direction, Document, DocumentQuery, FieldFilter, FieldValue, FilterOp,
    DOCUMENT_ID_FIELD,
};
use crate::backend::storage::traits::DocumentStore;

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<BTreeMap<String, Vec<Document>>>>,
    fail_ordered_queries: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every ordered query the way a database without the matching
    /// composite index does
    pub fn without_composite_indexes(mut self) -> Self {
        self.fail_ordered_queries = true;
        self
    }

    /// Insert or replace a document
    pub fn insert(&self, document: Document) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| anyhow!("document store lock poisoned"))?;
        let documents = collections.entry(document.collection().to_string()).or_default();
        match documents.iter_mut().find(|existing| existing.path == document.path) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert) for fixtures
    pub fn with_documents(self, documents: impl IntoIterator<Item = Document>) -> Result<Self> {
        for document in documents {
            self.insert(document)?;
        }
        Ok(self)
    }
}

fn values_equal(left: &FieldValue, right: &FieldValue) -> bool {
    match compare_values(left, right) {
        Some(ordering) => ordering == Ordering::Equal,
        None => left == right,
    }
}

fn field_of<'a>(document: &'a Document, field: &str, id_value: &'a FieldValue) -> Option<&'a FieldValue> {
    if field == DOCUMENT_ID_FIELD {
        Some(id_value)
    } else {
        document.get(field)
    }
}

fn matches(document: &Document, filter: &FieldFilter) -> bool {
    let id_value = FieldValue::Reference(document.path.clone());
    let value = match field_of(document, &filter.field, &id_value) {
        Some(value) => value,
        None => return false,
    };
    match filter.op {
        FilterOp::Equal => values_equal(value, &filter.value),
        FilterOp::GreaterOrEqual => matches!(
            compare_values(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::LessOrEqual => matches!(
            compare_values(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::In => filter
            .value
            .as_array()
            .map(|candidates| candidates.iter().any(|candidate| values_equal(value, candidate)))
            .unwrap_or(false),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn run_query(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        if self.fail_ordered_queries && query.order_by.is_some() {
            bail!("FAILED_PRECONDITION: the query requires an index");
        }

        let collections = self
            .collections
            .read()
            .map_err(|_| anyhow!("document store lock poisoned"))?;
        let mut results: Vec<Document> = collections
            .get(&query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| query.filters.iter().all(|filter| matches(document, filter)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            results.retain(|document| document.get(field).is_some());
            results.sort_by(|a, b| {
                let ordering = match (a.get(field), b.get(field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            results.truncate(limit as usize);
        }
        Ok(results)
    }

    async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| anyhow!("document store lock poisoned"))?;
        let collection = path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("");
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|document| document.path == path))
            .cloned())
    }
}
