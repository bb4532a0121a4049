//! Typed repositories over a [`DocumentStore`].
//!
//! Each repository owns the collection and field names of one area and
//! decodes documents into domain models.

pub mod attendance_mark_repository;
pub mod booking_repository;
pub mod catalog_repository;
pub mod complaint_repository;
pub mod customer_repository;
pub mod wallet_repository;

pub use attendance_mark_repository::AttendanceMarkRepository;
pub use booking_repository::BookingRepository;
pub use catalog_repository::CatalogRepository;
pub use complaint_repository::ComplaintRepository;
pub use customer_repository::CustomerRepository;
pub use wallet_repository::WalletRepository;

use anyhow::Result;
use futures::future::try_join_all;
use std::cmp::Ordering;
use tracing::warn;

use crate::backend::storage::document::{compare_values, Direction, Document, DocumentQuery, FieldValue};
use crate::backend::storage::traits::DocumentStore;

/// Most values an `IN` filter may carry
pub const IN_QUERY_LIMIT: usize = 10;

pub const CUSTOMER_COLLECTION: &str = "customer";

/// Reference to a document of the `customer` collection
pub fn customer_ref(id: &str) -> FieldValue {
    FieldValue::reference(CUSTOMER_COLLECTION, id)
}

/// Run `query` once per chunk of `values`, each chunk as an `IN` filter on
/// `field`, and concatenate the results
pub async fn query_in_chunks(
    store: &dyn DocumentStore,
    query: &DocumentQuery,
    field: &str,
    values: Vec<FieldValue>,
) -> Result<Vec<Document>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let queries: Vec<DocumentQuery> = values
        .chunks(IN_QUERY_LIMIT)
        .map(|chunk| query.clone().where_in(field, chunk.to_vec()))
        .collect();
    let batches = try_join_all(queries.iter().map(|q| store.run_query(q))).await?;
    Ok(batches.into_iter().flatten().collect())
}

/// Run an ordered query. When the store rejects it (typically a missing
/// composite index) the query is retried without ordering and sorted here.
pub async fn query_ordered(store: &dyn DocumentStore, query: &DocumentQuery) -> Result<Vec<Document>> {
    match store.run_query(query).await {
        Ok(documents) => Ok(documents),
        Err(e) if query.order_by.is_some() => {
            warn!(
                "Ordered query on {} failed, sorting in memory instead: {}",
                query.collection, e
            );
            let mut fallback = query.without_order();
            fallback.limit = None;
            let mut documents = store.run_query(&fallback).await?;
            if let Some((field, direction)) = &query.order_by {
                sort_documents(&mut documents, field, *direction);
            }
            if let Some(limit) = query.limit {
                documents.truncate(limit as usize);
            }
            Ok(documents)
        }
        Err(e) => Err(e),
    }
}

/// Sort by `field`; documents without the field go last
pub fn sort_documents(documents: &mut [Document], field: &str, direction: Direction) {
    documents.sort_by(|a, b| match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => {
            let ordering = compare_values(x, y).unwrap_or(Ordering::Equal);
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::memory::MemoryDocumentStore;
    use chrono::{TimeZone, Utc};

    fn payouts() -> MemoryDocumentStore {
        let docs = (1..=5).map(|day| {
            Document::new("Wallet_Transaction_record", &format!("t{}", day))
                .with("partnerId", customer_ref("p1"))
                .with("spend_date", Utc.with_ymd_and_hms(2025, 4, day, 0, 0, 0).unwrap())
        });
        MemoryDocumentStore::new().with_documents(docs).unwrap()
    }

    #[tokio::test]
    async fn test_ordered_query_falls_back_to_in_memory_sort() {
        let store = payouts().without_composite_indexes();
        let query = DocumentQuery::collection("Wallet_Transaction_record")
            .where_eq("partnerId", customer_ref("p1"))
            .order_by("spend_date", Direction::Descending)
            .limit(3);

        let ids: Vec<String> = query_ordered(&store, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["t5", "t4", "t3"]);
    }

    #[tokio::test]
    async fn test_in_queries_are_chunked() {
        let docs = (0..25).map(|i| Document::new("customer", &format!("c{}", i)).with("n", i as i64));
        let store = MemoryDocumentStore::new().with_documents(docs).unwrap();
        let values: Vec<FieldValue> = (0..25).map(|i| customer_ref(&format!("c{}", i))).collect();

        let found = query_in_chunks(
            &store,
            &DocumentQuery::collection("customer"),
            crate::backend::storage::document::DOCUMENT_ID_FIELD,
            values,
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 25);
    }
}
