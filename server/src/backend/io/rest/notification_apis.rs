//! # REST API for Notifications
//!
//! Pending booking and complaint counts behind the header bell. The front
//! end polls this endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_notification_counts))
}

async fn get_notification_counts(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/notifications");

    match state.notification_service.counts().await {
        Ok(counts) => Json(counts).into_response(),
        Err(e) => {
            error!("Failed to count notifications: {}", e);
            e.into_response()
        }
    }
}
