//! # REST API for Customers
//!
//! Customer directory with booking counts, its CSV and XLSX exports, and
//! the referrals made by one customer.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use shared::{CustomerListRequest, ReferralListRequest};

use crate::backend::domain::ExportFormat;
use crate::backend::io::rest::errors::attachment;
use crate::backend::io::rest::mappers::QueryMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers))
        .route("/export.csv", get(export_customers_csv))
        .route("/export.xlsx", get(export_customers_xlsx))
        .route("/:id/referrals", get(get_referrals))
        .route("/:id/referrals/export.xlsx", get(export_referrals))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListRequest>,
) -> impl IntoResponse {
    info!("GET /api/customers - query: {:?}", query);

    let list_query = match QueryMapper::customer_list(&state.calendar, query, state.customer_service.default_range()) {
        Ok(list_query) => list_query,
        Err(e) => return e.into_response(),
    };
    match state.customer_service.list(&list_query).await {
        Ok(customers) => Json(customers).into_response(),
        Err(e) => {
            error!("Failed to list customers: {}", e);
            e.into_response()
        }
    }
}

async fn export_customers(state: AppState, query: CustomerListRequest, format: ExportFormat) -> axum::response::Response {
    let list_query = match QueryMapper::customer_list(&state.calendar, query, state.customer_service.default_range()) {
        Ok(list_query) => list_query,
        Err(e) => return e.into_response(),
    };
    match state.customer_service.export(&list_query, format).await {
        Ok(file) => attachment(file),
        Err(e) => {
            error!("Failed to export customers: {}", e);
            e.into_response()
        }
    }
}

async fn export_customers_csv(
    State(state): State<AppState>,
    Query(query): Query<CustomerListRequest>,
) -> impl IntoResponse {
    info!("GET /api/customers/export.csv - query: {:?}", query);
    export_customers(state, query, ExportFormat::Csv).await
}

async fn export_customers_xlsx(
    State(state): State<AppState>,
    Query(query): Query<CustomerListRequest>,
) -> impl IntoResponse {
    info!("GET /api/customers/export.xlsx - query: {:?}", query);
    export_customers(state, query, ExportFormat::Xlsx).await
}

async fn get_referrals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReferralListRequest>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}/referrals - query: {:?}", id, query);

    match state.customer_service.referrals(&QueryMapper::referrals(id, query)).await {
        Ok(referrals) => Json(referrals).into_response(),
        Err(e) => {
            error!("Failed to load referrals: {}", e);
            e.into_response()
        }
    }
}

async fn export_referrals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReferralListRequest>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}/referrals/export.xlsx - query: {:?}", id, query);

    match state.customer_service.export_referrals(&QueryMapper::referrals(id, query)).await {
        Ok(file) => attachment(file),
        Err(e) => {
            error!("Failed to export referrals: {}", e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::test_support::{fake_gateways, get_json, router_with, send};
    use axum::http::{header, Method, StatusCode};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 6, 0, 0).unwrap()
    }

    fn customer(id: &str, name: &str, created: DateTime<Utc>) -> Document {
        let mut roles = BTreeMap::new();
        roles.insert("customer".to_string(), FieldValue::Bool(true));
        Document::new("customer", id)
            .with("userType", roles)
            .with("display_name", name)
            .with("created_time", created)
    }

    fn documents() -> Vec<Document> {
        vec![
            customer("c1", "Asha", at(4, 2)).with("referralCode", "ASHA10"),
            customer("c2", "Vikram", at(5, 5)).with("referralBy", "ASHA10").with("email", "vikram@example.com"),
            customer("c3", "Before History", at(3, 20)),
            Document::new("bookings", "b1")
                .with("customer_id", FieldValue::reference("customer", "c2"))
                .with("status", "Service_Completed")
                .with("date", at(5, 6))
                .with("amount_paid", 900i64),
        ]
    }

    fn app() -> axum::Router {
        router_with(documents(), fake_gateways())
    }

    #[tokio::test]
    async fn test_list_defaults_to_customer_history() -> Result<(), Box<dyn std::error::Error>> {
        let (status, body) = get_json(app(), "/api/customers").await?;
        assert_eq!(status, StatusCode::OK);

        let ids: Vec<&str> = body["customers"]
            .as_array()
            .map(|rows| rows.iter().filter_map(|r| r["id"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(body["customers"][0]["bookingCount"], 1);
        assert_eq!(body["pagination"]["pageSize"], 20);

        let (_, filtered) = get_json(app(), "/api/customers?bookings=0").await?;
        assert_eq!(filtered["customers"][0]["id"], "c1");
        Ok(())
    }

    #[tokio::test]
    async fn test_csv_export_is_an_attachment() -> Result<(), Box<dyn std::error::Error>> {
        let (status, headers, body) = send(app(), Method::GET, "/api/customers/export.csv?search=vikram", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=\"customers.csv\"");

        let text = String::from_utf8(body)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID,Name,Email,Phone,Bookings,Created");
        assert_eq!(lines[1], "c2,Vikram,vikram@example.com,—,1,2025-05-05 11:30");
        assert_eq!(lines.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_xlsx_export_content_type() -> Result<(), Box<dyn std::error::Error>> {
        let (status, headers, body) = send(app(), Method::GET, "/api/customers/export.xlsx", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert!(body.starts_with(b"PK"));
        Ok(())
    }

    #[tokio::test]
    async fn test_referrals() -> Result<(), Box<dyn std::error::Error>> {
        let (status, body) = get_json(app(), "/api/customers/c1/referrals").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["referralCode"], "ASHA10");
        assert_eq!(body["totalReferrals"], 1);
        assert_eq!(body["totalReferralBookings"], 1);
        assert_eq!(body["totalReferralEarnings"], 900.0);
        assert_eq!(body["referrals"][0]["customer"]["id"], "c2");

        let (status, body) = get_json(app(), "/api/customers/missing/referrals").await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Customer missing not found");

        let (status, headers, _) = send(app(), Method::GET, "/api/customers/c1/referrals/export.xlsx", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=\"referrals_c1.xlsx\"");
        Ok(())
    }
}
