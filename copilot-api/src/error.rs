//! Error types for copilot-api
//!
//! Response bodies:
//! - validation failure: 400 `{"error": {"formErrors": [..], "fieldErrors": {..}}}`
//! - bad request / not found: 400 / 404 `{"error": "<message>"}`
//! - rejected body: the extractor's status (e.g. 413, 415) `{"error": "<message>"}`
//! - integration failure: 500 `{"error": "<message>", "details": "<cause>"}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use copilot_common::csv_import::ImportError;
use copilot_common::FieldErrors;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed field validation (400)
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body refused before parsing, keeping the extractor's status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Store, AI or telephony failure (500)
    #[error("{message}: {details}")]
    Failed { message: String, details: String },
}

impl ApiError {
    /// Integration failure; logged with the route it happened on
    pub fn failed(integration: &str, message: &str, cause: impl std::fmt::Display) -> Self {
        let details = cause.to_string();
        error!(integration, details = %details, "{}", message);
        ApiError::Failed {
            message: message.to_string(),
            details,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Parse(e) => ApiError::BadRequest(format!("Unable to parse CSV: {}", e)),
            invalid @ ImportError::InvalidRow { .. } => ApiError::BadRequest(invalid.to_string()),
            ImportError::Store(e) => ApiError::failed("import", "Failed to import rows.", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "error": errors })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Rejected { status, message } => (status, json!({ "error": message })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Failed { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message, "details": details }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
