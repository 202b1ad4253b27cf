use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// User login attempt
    Login,
    /// User logout
    Logout,
    /// Token refresh
    TokenRefresh,
    /// Token revocation
    TokenRevocation,
    /// User registration
    Registration,
    /// Failed login attempt
    FailedLogin,
    /// Token validation
    TokenValidation,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::Logout => write!(f, "LOGOUT"),
            AuthEventType::TokenRefresh => write!(f, "TOKEN_REFRESH"),
            AuthEventType::TokenRevocation => write!(f, "TOKEN_REVOCATION"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID or attempted email, if known
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// The resource being accessed (if applicable)
    pub resource: Option<String>,
    /// Authentication method used (password, token, etc.)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: AuthEvent) {
    let user_id_str = event.user_id.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id_str,
            status,
            event.timestamp.to_rfc3339(),
            resource,
            details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id_str,
            status,
            event.timestamp.to_rfc3339(),
            resource,
            details
        );
    }
}

pub fn log_registration(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Registration, Some(user_id), true).with_auth_method("password"));
}

pub fn log_successful_login(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Login, Some(user_id), true).with_auth_method("password"));
}

/// Log a failed login attempt. Never pass the attempted password.
pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

pub fn log_token_validation(user_id: Option<&str>, resource: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenValidation, user_id, success)
        .with_resource(resource)
        .with_auth_method("bearer");
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

pub fn log_token_refresh(user_id: Option<&str>, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRefresh, user_id, success);
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

pub fn log_logout(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Logout, Some(user_id), true));
}

pub fn log_token_revocation(user_id: &str, token_id: &str) {
    let event = AuthEvent::new(AuthEventType::TokenRevocation, Some(user_id), true)
        .with_details(format!("jti={}", token_id));
    log_auth_event(event);
}
