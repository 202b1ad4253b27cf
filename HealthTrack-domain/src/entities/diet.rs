use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Meal slot a diet record belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A logged meal or food item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DietRecord {
    pub id: String,
    pub meal_type: MealType,
    pub food_name: String,

    /// Energy in kcal
    pub calories: f64,

    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub notes: Option<String>,

    /// When the food was eaten (RFC 3339, UTC)
    pub recorded_at: String,
}

/// Request payload for logging food
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateDietRecordRequest {
    pub meal_type: MealType,

    #[validate(length(min = 1, max = 200, message = "Food name must be between 1 and 200 characters"))]
    pub food_name: String,

    #[validate(range(min = 0.0, max = 10000.0, message = "Calories must be between 0 and 10000"))]
    pub calories: f64,

    #[validate(range(min = 0.0, max = 1000.0, message = "Protein must be between 0 and 1000 g"))]
    pub protein_g: Option<f64>,

    #[validate(range(min = 0.0, max = 1000.0, message = "Carbohydrates must be between 0 and 1000 g"))]
    pub carbs_g: Option<f64>,

    #[validate(range(min = 0.0, max = 1000.0, message = "Fat must be between 0 and 1000 g"))]
    pub fat_g: Option<f64>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// Defaults to the current time
    pub recorded_at: Option<String>,
}

/// Nutrition totals for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DailyDietSummary {
    /// YYYY-MM-DD
    pub date: String,
    pub total_calories: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub meal_count: u32,
}

/// Daily averages over a period, used by the analysis report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DietOverview {
    /// Days in the period that have at least one record
    pub days_logged: usize,
    pub avg_daily_calories: f64,
    pub avg_daily_protein_g: f64,
    pub avg_daily_carbs_g: f64,
    pub avg_daily_fat_g: f64,
    pub period_days: u32,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calorie_and_macro_ranges() {
        let mut request = CreateDietRecordRequest {
            meal_type: MealType::Lunch,
            food_name: "Rice".to_string(),
            calories: 350.0,
            protein_g: Some(7.0),
            carbs_g: Some(77.0),
            fat_g: None,
            notes: None,
            recorded_at: None,
        };
        assert!(request.validate().is_ok());

        request.calories = 12000.0;
        assert!(request.validate().is_err());

        request.calories = 350.0;
        request.fat_g = Some(-1.0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_meal_type_wire_form() {
        let meal: MealType = serde_json::from_str("\"snack\"").unwrap();
        assert_eq!(meal, MealType::Snack);
        assert_eq!(MealType::parse(meal.as_str()), Some(MealType::Snack));
    }
}
