use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::domain::calendar::TimeWindow;
use crate::backend::domain::models::Complaint;
use crate::backend::storage::document::{Document, DocumentQuery};
use crate::backend::storage::traits::{ComplaintStorage, DocumentStore};

const COMPLAINTS: &str = "customer_complain";

#[derive(Clone)]
pub struct ComplaintRepository {
    store: Arc<dyn DocumentStore>,
}

impl ComplaintRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn decode_complaint(document: &Document) -> Complaint {
    Complaint {
        id: document.id.clone(),
        raised_at: document.timestamp("date_of_complaint"),
        status: document.text("complaint_status"),
    }
}

#[async_trait]
impl ComplaintStorage for ComplaintRepository {
    async fn list_complaints_between(&self, window: &TimeWindow) -> Result<Vec<Complaint>> {
        let query = DocumentQuery::collection(COMPLAINTS).where_between("date_of_complaint", window.start, window.end);
        let documents = self.store.run_query(&query).await?;
        Ok(documents.iter().map(decode_complaint).collect())
    }

    async fn count_pending_complaints(&self) -> Result<usize> {
        let query = DocumentQuery::collection(COMPLAINTS).where_eq("complaint_status", "pending");
        Ok(self.store.run_query(&query).await?.len())
    }
}
