use serde::{Deserialize, Serialize};

/// Storage model for a generated set of advice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: String,
    pub user_id: String,

    /// rules or llm
    pub source: String,

    /// Advice lines
    pub advice: Vec<String>,

    pub period_days: u32,
    pub created_at: String,
}

/// Input data for storing advice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecommendation {
    pub user_id: String,
    pub source: String,
    pub advice: Vec<String>,
    pub period_days: u32,
}
