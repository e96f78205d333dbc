//! Error types for the band site

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while serving the site
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A write the backend accepted without returning the stored row
    #[error("{0}")]
    NotSaved(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SiteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteError::NotFound(_) => StatusCode::NOT_FOUND,
            SiteError::Unauthorized | SiteError::Auth(_) => StatusCode::UNAUTHORIZED,
            SiteError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SiteError::Backend { status, .. } if (400..500).contains(status) => {
                StatusCode::BAD_REQUEST
            }
            SiteError::Backend { .. } | SiteError::Http(_) => StatusCode::BAD_GATEWAY,
            SiteError::NotSaved(_)
            | SiteError::Config(_)
            | SiteError::Io(_)
            | SiteError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed with {}: {}", status, self);
        }
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type alias for site operations
pub type Result<T> = std::result::Result<T, SiteError>;
