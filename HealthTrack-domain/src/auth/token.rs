use std::env;
use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::auth::token_blacklist::TokenBlacklist;
use crate::auth::Claims;

/// Default issuer written into and required from every token
pub const DEFAULT_ISSUER: &str = "health-track-api";

/// Security errors for authentication and token operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// An access token was presented where a refresh token is required, or the reverse
    #[error("Wrong token type: expected {0:?}")]
    WrongTokenType(TokenType),

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Token has been revoked
    #[error("Token has been revoked")]
    TokenRevoked,

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// The revocation list is full of unexpired tokens
    #[error("Token revocation list is full")]
    RevocationCapacity,
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

/// Signing secret, issuer and lifetimes for issued tokens
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_minutes", &self.access_token_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .finish()
    }
}

impl TokenConfig {
    /// Default lifetimes: access tokens expire in 15 minutes, refresh tokens in 7 days
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }

    /// Load from `JWT_SECRET`, `JWT_ISSUER`, `ACCESS_TOKEN_EXPIRATION_MINUTES`
    /// and `REFRESH_TOKEN_EXPIRATION_DAYS`. Only the secret is required.
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;
        if secret.trim().is_empty() {
            return Err(SecurityError::ConfigError("JWT_SECRET must not be empty".to_string()));
        }

        let mut config = Self::new(secret);
        if let Ok(issuer) = env::var("JWT_ISSUER") {
            if !issuer.trim().is_empty() {
                config.issuer = issuer;
            }
        }
        config.access_token_minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(config.access_token_minutes);
        config.refresh_token_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(config.refresh_token_days);

        Ok(config)
    }

    fn lifetime(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => Duration::minutes(self.access_token_minutes),
            TokenType::Refresh => Duration::days(self.refresh_token_days),
        }
    }
}

/// A freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Issues, validates and revokes JWTs
#[derive(Debug)]
pub struct TokenService {
    config: TokenConfig,
    blacklist: TokenBlacklist,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            config,
            blacklist: TokenBlacklist::new(),
        }
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.config.lifetime(TokenType::Access).num_seconds()
    }

    /// Generate a new JWT token
    pub fn generate_token(
        &self,
        user_id: &str,
        token_type: TokenType,
        roles: &[String],
    ) -> Result<String, SecurityError> {
        let now = Utc::now();
        let expiration = now + self.config.lifetime(token_type);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            roles: roles.to_vec(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        // Log token generation (but not the token itself)
        info!("Generated {:?} token for user {}", token_type, user_id);
        debug!("Token expiration: {}", expiration);

        Ok(token)
    }

    pub fn issue_pair(&self, user_id: &str, roles: &[String]) -> Result<TokenPair, SecurityError> {
        Ok(TokenPair {
            access_token: self.generate_token(user_id, TokenType::Access, roles)?,
            refresh_token: self.generate_token(user_id, TokenType::Refresh, roles)?,
            expires_in: self.access_ttl_seconds(),
        })
    }

    /// Validate a JWT token and return the decoded claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            ErrorKind::InvalidToken => SecurityError::InvalidToken,
            ErrorKind::InvalidSignature => SecurityError::TokenValidation("Invalid signature".to_string()),
            ErrorKind::InvalidIssuer => SecurityError::TokenValidation("Invalid issuer".to_string()),
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

        let claims = token_data.claims;
        if self.blacklist.is_revoked(&claims.jti) {
            debug!("Rejected revoked token {} for user {}", claims.jti, claims.sub);
            return Err(SecurityError::TokenRevoked);
        }

        Ok(claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, SecurityError> {
        self.validate_typed(token, TokenType::Access)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, SecurityError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, SecurityError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(SecurityError::WrongTokenType(expected));
        }
        Ok(claims)
    }

    /// Revoke a single token until it would have expired anyway
    pub fn revoke(&self, claims: &Claims) -> Result<(), SecurityError> {
        let expiration = UNIX_EPOCH + StdDuration::from_secs(claims.exp.max(0) as u64);
        let expiration = expiration.max(SystemTime::now());
        self.blacklist.revoke_token(&claims.jti, expiration)
    }

    pub fn is_revoked(&self, claims: &Claims) -> bool {
        self.blacklist.is_revoked(&claims.jti)
    }
}
