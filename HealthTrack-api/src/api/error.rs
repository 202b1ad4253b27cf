use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use health_track_domain::ServiceError;

/// Error response format for API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a not found error response
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn validation_error(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            details,
            ..Self::new("validation_error", message)
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new("insufficient_data", message)
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::new("upstream_error", message)
    }

    /// Internal details are logged by the caller, never returned
    pub fn internal_error() -> Self {
        Self::new("internal_error", "An unexpected error occurred")
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "not_found" | "insufficient_data" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => {
                warn!("Rejected request: {}", msg);
                ErrorResponse::validation_error(msg, None)
            }
            ServiceError::NotFound(msg) => ErrorResponse::not_found(msg),
            ServiceError::Conflict(msg) => ErrorResponse::conflict(msg),
            ServiceError::Unauthorized(msg) => ErrorResponse::unauthorized(msg),
            ServiceError::InsufficientData(msg) => ErrorResponse::insufficient_data(msg),
            ServiceError::Upstream(msg) => {
                error!("Upstream failure: {}", msg);
                ErrorResponse::upstream_error("An upstream service failed")
            }
            ServiceError::Repository(msg) | ServiceError::Crypto(msg) | ServiceError::Internal(msg) => {
                error!("Internal failure: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        ErrorResponse::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        ErrorResponse::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        ErrorResponse::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

/// Result type for every handler
pub type ApiResult<T> = Result<T, ErrorResponse>;
