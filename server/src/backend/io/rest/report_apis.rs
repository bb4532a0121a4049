//! # REST API for the WhatsApp Report
//!
//! `POST /api/whatsapp` sends the figures the dashboard posts;
//! `POST /api/whatsapp/daily` computes today's metrics on the server first.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use tracing::{error, info};

use shared::WhatsAppReportRequest;

use crate::backend::domain::report_service::report_from_metrics;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send_report))
        .route("/daily", post(send_daily_report))
}

async fn send_report(
    State(state): State<AppState>,
    Json(request): Json<WhatsAppReportRequest>,
) -> impl IntoResponse {
    info!("POST /api/whatsapp - request: {:?}", request);

    match state.report_service.send(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Failed to send WhatsApp report: {}", e);
            e.into_response()
        }
    }
}

async fn send_daily_report(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/whatsapp/daily");

    let metrics = match state.marketing_service.today().await {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to compute metrics for the daily report: {}", e);
            return e.into_response();
        }
    };
    match state.report_service.send(&report_from_metrics(&metrics)).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Failed to send daily WhatsApp report: {}", e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::domain::ReportTemplate;
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::storage::test_utils::RecordingGateway;
    use crate::backend::test_support::{fake_gateways, fixed_now, router_with, router_with_settings, send, settings};
    use crate::backend::BusinessSettings;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn with_recipients() -> BusinessSettings {
        BusinessSettings {
            report_template: ReportTemplate {
                recipients: vec!["919000000001".to_string()],
                ..ReportTemplate::default()
            },
            ..settings()
        }
    }

    fn app(gateway: &RecordingGateway, documents: Vec<Document>) -> axum::Router {
        let mut gateways = fake_gateways();
        gateways.messages = Arc::new(gateway.clone());
        router_with_settings(documents, gateways, with_recipients())
    }

    #[tokio::test]
    async fn test_missing_auth_key() -> Result<(), Box<dyn std::error::Error>> {
        let app = router_with(Vec::new(), fake_gateways());
        let (status, _, body) = send(app, Method::POST, "/api/whatsapp", Some(json!({}))).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body)?;
        assert_eq!(body, json!({ "error": "MSG91_AUTH_KEY not configured" }));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_is_sent() -> Result<(), Box<dyn std::error::Error>> {
        let gateway = RecordingGateway::accepting();
        let request = json!({ "completedBookings": 4, "marginPercentage": "18.2", "netProfit": 950.5 });

        let (status, _, body) = send(app(&gateway, Vec::new()), Method::POST, "/api/whatsapp", Some(request)).await?;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body)?;
        assert_eq!(body["success"], true);

        let sent = gateway.sent_payloads();
        let components = &sent[0]["payload"]["template"]["to_and_components"][0]["components"];
        assert_eq!(components["body_1"]["value"], "25/06/2025");
        assert_eq!(components["body_2"]["value"], "4");
        assert_eq!(components["body_3"]["value"], "0");
        assert_eq!(components["body_9"]["value"], "950.5");
        assert_eq!(components["body_10"]["value"], "18.2%");
        Ok(())
    }

    #[tokio::test]
    async fn test_upstream_rejection_passes_status_through() -> Result<(), Box<dyn std::error::Error>> {
        let gateway = RecordingGateway::rejecting(401, json!({ "message": "Unauthorized" }));
        let (status, _, body) = send(app(&gateway, Vec::new()), Method::POST, "/api/whatsapp", Some(json!({}))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: Value = serde_json::from_slice(&body)?;
        assert_eq!(body["error"], "Failed to send WhatsApp report");
        assert_eq!(body["details"]["message"], "Unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_report_uses_todays_metrics() -> Result<(), Box<dyn std::error::Error>> {
        let gateway = RecordingGateway::accepting();
        let documents = vec![Document::new("bookings", "b1")
            .with("provider_id", FieldValue::reference("customer", "p1"))
            .with("customer_id", FieldValue::reference("customer", "c1"))
            .with("status", "Service_Completed")
            .with("date", fixed_now())];

        let (status, _, _) = send(app(&gateway, documents), Method::POST, "/api/whatsapp/daily", None).await?;
        assert_eq!(status, StatusCode::OK);

        let sent = gateway.sent_payloads();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0]["payload"]["template"]["to_and_components"][0]["components"]["body_2"]["value"],
            "1"
        );
        Ok(())
    }
}
