use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::domain::calendar::TimeWindow;
use crate::backend::domain::models::AttendanceMark;
use crate::backend::storage::document::{Document, DocumentQuery};
use crate::backend::storage::traits::{AttendanceMarkStorage, DocumentStore};

/// Collection name as spelled by the partner app
const ATTENDANCE_MARKS: &str = "partner_attendence";

#[derive(Clone)]
pub struct AttendanceMarkRepository {
    store: Arc<dyn DocumentStore>,
}

impl AttendanceMarkRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn decode_mark(document: &Document) -> AttendanceMark {
    AttendanceMark {
        id: document.id.clone(),
        partner_id: document.reference_id("partnerid"),
        status: document.text("status"),
        marked_at: document.timestamp("startTime").or_else(|| document.timestamp("date")),
    }
}

#[async_trait]
impl AttendanceMarkStorage for AttendanceMarkRepository {
    async fn list_present_marks(&self, window: &TimeWindow) -> Result<Vec<AttendanceMark>> {
        // The time field varies between documents, so the window is applied here
        let query = DocumentQuery::collection(ATTENDANCE_MARKS).where_eq("status", "Present");
        let documents = self.store.run_query(&query).await?;
        Ok(documents
            .iter()
            .map(decode_mark)
            .filter(|mark| mark.marked_at.map(|at| window.contains(at)).unwrap_or(false))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::document::FieldValue;
    use crate::backend::storage::memory::MemoryDocumentStore;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_present_marks_use_start_time_or_date() {
        let today = Utc.with_ymd_and_hms(2025, 4, 1, 4, 0, 0).unwrap();
        let store = MemoryDocumentStore::new()
            .with_documents(vec![
                Document::new(ATTENDANCE_MARKS, "m1")
                    .with("status", "Present")
                    .with("startTime", today)
                    .with("partnerid", FieldValue::reference("customer", "p1")),
                Document::new(ATTENDANCE_MARKS, "m2").with("status", "Present").with("date", today),
                Document::new(ATTENDANCE_MARKS, "m3").with("status", "Absent").with("startTime", today),
                Document::new(ATTENDANCE_MARKS, "m4").with("status", "Present"),
                Document::new(ATTENDANCE_MARKS, "m5")
                    .with("status", "Present")
                    .with("startTime", Utc.with_ymd_and_hms(2025, 3, 30, 4, 0, 0).unwrap()),
            ])
            .unwrap();
        let repository = AttendanceMarkRepository::new(Arc::new(store));
        let window = TimeWindow {
            start: Utc.with_ymd_and_hms(2025, 3, 31, 18, 30, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 4, 1, 18, 29, 59).unwrap(),
        };

        let marks = repository.list_present_marks(&window).await.unwrap();
        let ids: Vec<&str> = marks.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(marks[0].partner_id.as_deref(), Some("p1"));
    }
}
