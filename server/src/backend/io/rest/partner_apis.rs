//! # REST API for Partners
//!
//! Partner directory, the top-partners leaderboard and the per-partner
//! pages: bookings, wallet earnings, fuel bills and attendance.
//!
//! Attendance is looked up by partner name (`?name=`); the `:id` segment
//! only keeps the URL shape consistent with the other partner pages.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use shared::{AttendanceRequest, DateRangeRequest, PartnerBookingsRequest, PartnerEarningsRequest, PartnerListRequest};

use crate::backend::io::rest::errors::attachment;
use crate::backend::io::rest::mappers::QueryMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_partners))
        .route("/export.csv", get(export_partners))
        .route("/top", get(get_top_partners))
        .route("/:id/bookings", get(get_partner_bookings))
        .route("/:id/earnings", get(get_partner_earnings))
        .route("/:id/fuel", get(get_partner_fuel))
        .route("/:id/fuel/export.csv", get(export_partner_fuel))
        .route("/:id/attendance", get(get_partner_attendance))
        .route("/:id/attendance/export.csv", get(export_partner_attendance))
}

async fn list_partners(
    State(state): State<AppState>,
    Query(query): Query<PartnerListRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners - query: {:?}", query);

    let list_query = match QueryMapper::partner_list(&state.calendar, query) {
        Ok(list_query) => list_query,
        Err(e) => return e.into_response(),
    };
    match state.partner_service.list(&list_query).await {
        Ok(partners) => Json(partners).into_response(),
        Err(e) => {
            error!("Failed to list partners: {}", e);
            e.into_response()
        }
    }
}

async fn export_partners(
    State(state): State<AppState>,
    Query(query): Query<PartnerListRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/export.csv - query: {:?}", query);

    let list_query = match QueryMapper::partner_list(&state.calendar, query) {
        Ok(list_query) => list_query,
        Err(e) => return e.into_response(),
    };
    match state.partner_service.export_csv(&list_query).await {
        Ok(file) => attachment(file),
        Err(e) => {
            error!("Failed to export partners: {}", e);
            e.into_response()
        }
    }
}

async fn get_top_partners(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/partners/top");

    match state.partner_service.top().await {
        Ok(partners) => Json(partners).into_response(),
        Err(e) => {
            error!("Failed to rank partners: {}", e);
            e.into_response()
        }
    }
}

async fn get_partner_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PartnerBookingsRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/{}/bookings - query: {:?}", id, query);

    let bookings_query = match QueryMapper::partner_bookings(&state.calendar, id, query) {
        Ok(bookings_query) => bookings_query,
        Err(e) => return e.into_response(),
    };
    match state.partner_booking_service.bookings(&bookings_query).await {
        Ok(bookings) => Json(bookings).into_response(),
        Err(e) => {
            error!("Failed to load partner bookings: {}", e);
            e.into_response()
        }
    }
}

async fn get_partner_earnings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PartnerEarningsRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/{}/earnings - query: {:?}", id, query);

    let earnings_query = match QueryMapper::partner_earnings(&state.calendar, id, query) {
        Ok(earnings_query) => earnings_query,
        Err(e) => return e.into_response(),
    };
    match state.earnings_service.earnings(&earnings_query).await {
        Ok(earnings) => Json(earnings).into_response(),
        Err(e) => {
            error!("Failed to load partner earnings: {}", e);
            e.into_response()
        }
    }
}

async fn get_partner_fuel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/{}/fuel - query: {:?}", id, query);

    let fuel_query = match QueryMapper::partner_fuel(&state.calendar, id, query) {
        Ok(fuel_query) => fuel_query,
        Err(e) => return e.into_response(),
    };
    match state.fuel_service.expenses(&fuel_query).await {
        Ok(expenses) => Json(expenses).into_response(),
        Err(e) => {
            error!("Failed to load fuel expenses: {}", e);
            e.into_response()
        }
    }
}

async fn export_partner_fuel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DateRangeRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/{}/fuel/export.csv - query: {:?}", id, query);

    let fuel_query = match QueryMapper::partner_fuel(&state.calendar, id, query) {
        Ok(fuel_query) => fuel_query,
        Err(e) => return e.into_response(),
    };
    match state.fuel_service.export_csv(&fuel_query).await {
        Ok(file) => attachment(file),
        Err(e) => {
            error!("Failed to export fuel expenses: {}", e);
            e.into_response()
        }
    }
}

async fn get_partner_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AttendanceRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/{}/attendance - query: {:?}", id, query);

    let attendance_query = match QueryMapper::attendance(&state.calendar, query) {
        Ok(attendance_query) => attendance_query,
        Err(e) => return e.into_response(),
    };
    match state.attendance_service.attendance(&attendance_query).await {
        Ok(attendance) => Json(attendance).into_response(),
        Err(e) => {
            error!("Failed to load attendance: {}", e);
            e.into_response()
        }
    }
}

async fn export_partner_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AttendanceRequest>,
) -> impl IntoResponse {
    info!("GET /api/partners/{}/attendance/export.csv - query: {:?}", id, query);

    let attendance_query = match QueryMapper::attendance(&state.calendar, query) {
        Ok(attendance_query) => attendance_query,
        Err(e) => return e.into_response(),
    };
    match state.attendance_service.export_csv(&attendance_query).await {
        Ok(file) => attachment(file),
        Err(e) => {
            error!("Failed to export attendance: {}", e);
            e.into_response()
        }
    }
}
