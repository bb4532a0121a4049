//! # REST API for Marketing Metrics
//!
//! Today's booking, profit and complaint figures, as shown on the marketing
//! page and sent in the daily WhatsApp report.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/today", get(get_today_metrics))
}

async fn get_today_metrics(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/marketing/today");

    match state.marketing_service.today().await {
        Ok(metrics) => Json(metrics).into_response(),
        Err(e) => {
            error!("Failed to compute marketing metrics: {}", e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::test_support::{fake_gateways, fixed_now, get_json, router_with};
    use axum::http::StatusCode;

    fn booking(id: &str, provider: &str, customer: &str, status: &str, paid: i64) -> Document {
        Document::new("bookings", id)
            .with("provider_id", FieldValue::reference("customer", provider))
            .with("customer_id", FieldValue::reference("customer", customer))
            .with("status", status)
            .with("date", fixed_now())
            .with("amount_paid", paid)
    }

    #[tokio::test]
    async fn test_today_metrics() -> Result<(), Box<dyn std::error::Error>> {
        let documents = vec![
            booking("b1", "p1", "c1", "Service_Completed", 1500),
            booking("b2", "p2", "c2", "Service_Completed", 500),
            booking("b3", "p9", "c3", "Booking_Cancelled", 0),
            Document::new("customer_complain", "k1")
                .with("complaint_status", "resolved")
                .with("date_of_complaint", fixed_now()),
        ];

        let (status, metrics) = get_json(router_with(documents, fake_gateways()), "/api/marketing/today").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(metrics["completedBookings"], 2);
        assert_eq!(metrics["cancelledBookings"], 1);
        assert_eq!(metrics["totalAmountPaid"], 2000.0);
        assert_eq!(metrics["customerAcquisitionCost"], 0.0);
        assert_eq!(metrics["totalComplaints"], 1);
        assert_eq!(metrics["resolvedComplaints"], 1);
        assert_eq!(metrics["categoryBookings"]["Driver"], 0);
        Ok(())
    }
}
