//! # REST API for the Booking Ledger
//!
//! Rows of the booking sheet the operations team keeps by hand, with summary
//! stats and a searchable table.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use shared::{DateRangeRequest, SheetBookingTableRequest};

use crate::backend::io::rest::mappers::QueryMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sheet", get(get_sheet_bookings))
        .route("/sheet/stats", get(get_sheet_stats))
        .route("/sheet/table", get(get_sheet_table))
}

async fn get_sheet_bookings(
    State(state): State<AppState>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/bookings/sheet - query: {:?}", query);

    let range = match QueryMapper::required_range(query.from.as_deref(), query.to.as_deref()) {
        Ok(range) => range,
        Err(e) => return e.into_response(),
    };
    match state.sheet_booking_service.bookings(&range).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Failed to fetch sheet bookings: {}", e);
            e.into_response()
        }
    }
}

async fn get_sheet_stats(
    State(state): State<AppState>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/bookings/sheet/stats - query: {:?}", query);

    let range = match QueryMapper::required_range(query.from.as_deref(), query.to.as_deref()) {
        Ok(range) => range,
        Err(e) => return e.into_response(),
    };
    match state.sheet_booking_service.stats(&range).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Failed to summarize sheet bookings: {}", e);
            e.into_response()
        }
    }
}

async fn get_sheet_table(
    State(state): State<AppState>,
    Query(query): Query<SheetBookingTableRequest>,
) -> impl IntoResponse {
    info!("GET /api/bookings/sheet/table - query: {:?}", query);

    let table_query = match QueryMapper::sheet_table(query) {
        Ok(table_query) => table_query,
        Err(e) => return e.into_response(),
    };
    match state.sheet_booking_service.table(&table_query).await {
        Ok(table) => Json(table).into_response(),
        Err(e) => {
            error!("Failed to build sheet booking table: {}", e);
            e.into_response()
        }
    }
}
