use thiserror::Error;

/// Failure of a client call
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered 401. The stored session has been cleared.
    #[error("Not authenticated")]
    Unauthorized,

    /// Any other non-2xx answer, carrying the server's error body
    #[error("API error {status} ({code}): {message}")]
    Api { status: u16, code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
