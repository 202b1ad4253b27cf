use serde::{Deserialize, Serialize};

/// Storage model for a logged meal or food item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DietRecord {
    pub id: String,
    pub user_id: String,
    pub meal_type: String,
    pub food_name: String,
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: String,
}

/// Input data for inserting a diet record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDietRecord {
    pub user_id: String,
    pub meal_type: String,
    pub food_name: String,
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: String,
}

/// Per-day nutrition totals, aggregated in SQL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyDietTotals {
    /// Calendar date (YYYY-MM-DD, UTC)
    pub date: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub meal_count: u32,
}
