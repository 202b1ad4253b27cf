//! Authentication for the HealthTrack API
//!
//! HS256 access and refresh tokens, in-process revocation by token id,
//! argon2 password hashing and structured auth-event logging. The HTTP
//! middleware that applies these lives in the API crate.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

// JWT issuing and validation
pub mod token;

// Token blacklist for revocation
pub mod token_blacklist;

// Password hashing
pub mod password;

// Include logging module
pub mod logging;

pub use token::{SecurityError, TokenConfig, TokenPair, TokenService, TokenType};
pub use token_blacklist::TokenBlacklist;

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id, the key used for revocation
    pub jti: String,
    pub token_type: TokenType,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The caller of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub roles: Vec<String>,
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            roles: claims.roles.clone(),
            claims,
        }
    }
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
