//! # REST API for Profit and Loss
//!
//! Rolling twelve months of sheet expenses against Razorpay settlements.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_pnl))
}

async fn get_pnl(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/pnl");

    match state.pnl_service.report().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!("Failed to build P&L: {}", e);
            e.into_response()
        }
    }
}
