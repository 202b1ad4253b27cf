use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// What a goal measures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    Weight,
    Steps,
    Systolic,
    HeartRate,
    Calories,
    Custom,
}

impl GoalMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalMetric::Weight => "weight",
            GoalMetric::Steps => "steps",
            GoalMetric::Systolic => "systolic",
            GoalMetric::HeartRate => "heart_rate",
            GoalMetric::Calories => "calories",
            GoalMetric::Custom => "custom",
        }
    }

    /// Unknown stored values fall back to `Custom`
    pub fn parse(value: &str) -> Self {
        match value {
            "weight" => GoalMetric::Weight,
            "steps" => GoalMetric::Steps,
            "systolic" => GoalMetric::Systolic,
            "heart_rate" => GoalMetric::HeartRate,
            "calories" => GoalMetric::Calories,
            _ => GoalMetric::Custom,
        }
    }
}

/// Lifecycle of a goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(GoalStatus::Active),
            "completed" => Some(GoalStatus::Completed),
            "abandoned" => Some(GoalStatus::Abandoned),
            _ => None,
        }
    }
}

/// A goal with its computed progress
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub metric: GoalMetric,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,

    /// YYYY-MM-DD
    pub deadline: Option<String>,

    pub status: GoalStatus,

    /// `current_value / target_value` as a percentage in [0, 100]
    pub progress_percent: f64,

    pub created_at: String,
    pub updated_at: String,
}

/// Request payload for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    pub metric: GoalMetric,

    pub target_value: f64,

    /// Starting value, 0 when omitted
    pub current_value: Option<f64>,

    #[validate(length(max = 32, message = "Unit cannot exceed 32 characters"))]
    pub unit: Option<String>,

    /// YYYY-MM-DD
    pub deadline: Option<String>,
}

/// Request payload for recording progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateGoalProgressRequest {
    pub current_value: f64,
}

/// Request payload for changing a goal's status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateGoalStatusRequest {
    pub status: GoalStatus,
}
