use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// A registered user's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub gender: Option<Gender>,

    /// YYYY-MM-DD
    pub birth_date: Option<String>,

    pub height_cm: Option<f64>,
    pub roles: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Name cannot exceed 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile fields to change; omitted fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    pub gender: Option<Gender>,

    /// YYYY-MM-DD
    pub birth_date: Option<String>,

    #[validate(range(min = 30.0, max = 300.0, message = "Height must be between 30 and 300 cm"))]
    pub height_cm: Option<f64>,
}

/// Tokens issued on register, login and refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthResponse {
    pub access_token: String,

    /// Absent when only the access token was renewed
    pub refresh_token: Option<String>,

    /// Always `Bearer`
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    pub user: User,
}
