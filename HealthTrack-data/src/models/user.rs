use serde::{Deserialize, Serialize};

/// Storage model for a registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: String,

    /// Lower-cased login email
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,

    pub name: Option<String>,
    pub gender: Option<String>,

    /// Calendar date (YYYY-MM-DD)
    pub birth_date: Option<String>,

    pub height_cm: Option<f64>,

    /// Comma-separated role names
    pub roles: String,

    pub created_at: String,
    pub updated_at: String,
}

/// Input data for inserting a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub roles: String,
}

/// Profile fields a user may change. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub height_cm: Option<f64>,
}
