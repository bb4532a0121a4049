//! HTTP rendering of domain errors and file downloads.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;

use crate::backend::domain::error::DashboardError;
use crate::backend::domain::export_service::ExportFile;

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::InvalidInput(_) | DashboardError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            DashboardError::NotConfigured(_) | DashboardError::Storage { .. } | DashboardError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            DashboardError::Upstream { details, .. } => Some(details.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

/// Serve an export as a download
pub fn attachment(file: ExportFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.filename.replace('"', ""));
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}
