use health_track_data::repository::RepositoryError;
use thiserror::Error;
use tracing::error;
use validator::{Validate, ValidationErrors};

use crate::auth::SecurityError;

/// Errors returned by every domain service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested record does not exist for this user
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credentials or token were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not enough data to compute the requested result
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(String),

    /// Credential secret could not be sealed or opened
    #[error("Credential encryption error: {0}")]
    Crypto(String),

    /// An external service failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
            other => {
                error!("Repository failure: {}", other);
                ServiceError::Repository(other.to_string())
            }
        }
    }
}

impl From<SecurityError> for ServiceError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::ConfigError(msg) | SecurityError::PasswordHash(msg) => {
                error!("Security failure: {}", msg);
                ServiceError::Internal(msg)
            }
            SecurityError::RevocationCapacity => {
                let msg = SecurityError::RevocationCapacity.to_string();
                error!("Security failure: {}", msg);
                ServiceError::Internal(msg)
            }
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

/// Run `validator` rules and flatten failures into one message, e.g.
/// `systolic: Systolic must be between 40 and 300; notes: Invalid notes`
pub fn validate_request<T: Validate>(request: &T) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|errors| ServiceError::Validation(flatten_validation_errors(&errors)))
}

fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();

    // HashMap order is random; keep messages stable
    fields.sort();
    fields.join("; ")
}
