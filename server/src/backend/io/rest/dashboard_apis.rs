//! # REST API for the Dashboard Overview
//!
//! Booking stats, category counts, the monthly CAC series, today's overview
//! and the expense breakdown. Ranges default to the current month unless
//! noted.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use shared::{DateRangeRequest, ExpenseBreakdownRequest};

use crate::backend::io::rest::mappers::QueryMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_booking_stats))
        .route("/categories", get(get_category_bookings))
        .route("/cac", get(get_cac_series))
        .route("/daily-overview", get(get_daily_overview))
        .route("/expenses", get(get_expense_breakdown))
}

async fn get_booking_stats(
    State(state): State<AppState>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/dashboard/stats - query: {:?}", query);

    let range = match QueryMapper::range_or(&state.calendar, &query, state.calendar.current_month_range()) {
        Ok(range) => range,
        Err(e) => return e.into_response(),
    };
    match state.dashboard_service.booking_stats(&range).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Failed to compute booking stats: {}", e);
            e.into_response()
        }
    }
}

async fn get_category_bookings(
    State(state): State<AppState>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/dashboard/categories - query: {:?}", query);

    let range = match QueryMapper::range_or(&state.calendar, &query, state.calendar.current_month_range()) {
        Ok(range) => range,
        Err(e) => return e.into_response(),
    };
    match state.dashboard_service.category_bookings(&range).await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => {
            error!("Failed to count category bookings: {}", e);
            e.into_response()
        }
    }
}

/// Defaults to the first day five months back through today
async fn get_cac_series(
    State(state): State<AppState>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/dashboard/cac - query: {:?}", query);

    let range = match QueryMapper::range_or(&state.calendar, &query, state.cac_service.default_range()) {
        Ok(range) => range,
        Err(e) => return e.into_response(),
    };
    match state.cac_service.monthly_series(&range).await {
        Ok(series) => Json(series).into_response(),
        Err(e) => {
            error!("Failed to build CAC series: {}", e);
            e.into_response()
        }
    }
}

async fn get_daily_overview(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard/daily-overview");

    Json(state.daily_overview_service.overview().await)
}

async fn get_expense_breakdown(
    State(state): State<AppState>,
    Query(query): Query<ExpenseBreakdownRequest>,
) -> impl IntoResponse {
    info!("GET /api/dashboard/expenses - query: {:?}", query);

    match state.expense_service.breakdown(query.month.as_deref()).await {
        Ok(breakdown) => Json(breakdown).into_response(),
        Err(e) => {
            error!("Failed to build expense breakdown: {}", e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::storage::test_utils::FakeSheets;
    use crate::backend::test_support::{fake_gateways, get_json, router_with};
    use crate::backend::Gateways;
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    const EXPENSES: &str = "Month,Ads,Fuel,Total\nMay 2025,2000,1000,3000\nJune 2025,2400,600,3000\n";

    fn gateways() -> Gateways {
        let mut gateways = fake_gateways();
        gateways.sheets = Arc::new(FakeSheets::new(EXPENSES, ""));
        gateways
    }

    fn booking(id: &str, provider: &str, customer: &str, status: &str, day: u32, paid: i64) -> Document {
        Document::new("bookings", id)
            .with("provider_id", FieldValue::reference("customer", provider))
            .with("customer_id", FieldValue::reference("customer", customer))
            .with("status", status)
            .with("date", Utc.with_ymd_and_hms(2025, 6, day, 6, 0, 0).unwrap())
            .with("amount_paid", paid)
    }

    fn documents() -> Vec<Document> {
        vec![
            booking("b1", "p1", "c1", "Service_Completed", 3, 1200),
            booking("b2", "p2", "c2", "Pending", 10, 0),
            booking("b3", "outsider", "c3", "Service_Completed", 12, 5000),
        ]
    }

    #[tokio::test]
    async fn test_stats_default_to_current_month() -> Result<(), Box<dyn std::error::Error>> {
        let (status, stats) = get_json(router_with(documents(), gateways()), "/api/dashboard/stats").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalBookings"], 2);
        assert_eq!(stats["completedBookings"], 1);
        assert_eq!(stats["totalRevenue"], 1200.0);
        assert_eq!(stats["averageRating"], 5.0);
        assert_eq!(stats["cac"], 3000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_reject_malformed_dates() -> Result<(), Box<dyn std::error::Error>> {
        let (status, body) = get_json(router_with(documents(), gateways()), "/api/dashboard/stats?from=06/01/2025").await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("06/01/2025"));
        Ok(())
    }

    #[tokio::test]
    async fn test_categories_and_cac_series() -> Result<(), Box<dyn std::error::Error>> {
        let (status, categories) = get_json(router_with(documents(), gateways()), "/api/dashboard/categories").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(categories["Cleaning"], 0);

        let (status, series) =
            get_json(router_with(documents(), gateways()), "/api/dashboard/cac?from=2025-05-01&to=2025-06-30").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(series["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(series["data"][1]["key"], "2025-06");
        assert_eq!(series["data"][1]["customersWithOneBooking"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_overview_survives_missing_sheet() -> Result<(), Box<dyn std::error::Error>> {
        let (status, overview) = get_json(router_with(Vec::new(), fake_gateways()), "/api/dashboard/daily-overview").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["date"], "Wednesday, 25 Jun 2025");
        assert_eq!(overview["dailyAverageExpense"], 0.0);
        assert_eq!(overview["totalBookings"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_breakdown() -> Result<(), Box<dyn std::error::Error>> {
        let (status, breakdown) =
            get_json(router_with(Vec::new(), gateways()), "/api/dashboard/expenses?month=May%202025").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(breakdown["selectedMonth"], "May 2025");
        assert_eq!(breakdown["total"], 3000.0);
        assert_eq!(breakdown["slices"][0]["name"], "Ads");
        assert_eq!(breakdown["slices"][0]["percentage"], 66.7);

        let (status, _) = get_json(router_with(Vec::new(), fake_gateways()), "/api/dashboard/expenses").await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
