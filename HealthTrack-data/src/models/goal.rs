use serde::{Deserialize, Serialize};

/// Storage model for a health goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub metric: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,

    /// Calendar date (YYYY-MM-DD)
    pub deadline: Option<String>,

    /// active, completed or abandoned
    pub status: String,

    pub created_at: String,
    pub updated_at: String,
}

/// Input data for inserting a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub user_id: String,
    pub title: String,
    pub metric: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub deadline: Option<String>,
    pub status: String,
}
