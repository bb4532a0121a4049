//! Error type returned by dashboard services.
//!
//! Each variant maps to one HTTP status in the REST layer; services that
//! only orchestrate storage calls keep using `anyhow` and are wrapped into
//! [`DashboardError::Storage`] at the service boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: serde_json::Value,
    },

    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl DashboardError {
    /// Wrap a storage or upstream failure behind a client-facing message
    pub fn storage(message: &str, source: anyhow::Error) -> Self {
        DashboardError::Storage {
            message: message.to_string(),
            source,
        }
    }

    /// Closure form of [`DashboardError::storage`] for `map_err`
    pub fn storage_with(message: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| DashboardError::storage(message, source)
    }
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_message_names_the_setting() {
        let error = DashboardError::NotConfigured("MSG91_AUTH_KEY".to_string());
        assert_eq!(error.to_string(), "MSG91_AUTH_KEY not configured");
    }

    #[test]
    fn test_storage_error_keeps_client_message_and_source() {
        let error = DashboardError::storage("Failed to fetch sheet bookings", anyhow::anyhow!("timeout"));
        assert_eq!(error.to_string(), "Failed to fetch sheet bookings");
        assert!(std::error::Error::source(&error).is_some());
    }
}
