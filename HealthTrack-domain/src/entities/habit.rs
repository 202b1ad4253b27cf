use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Completion statistics for a habit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HabitStats {
    /// Days with a check-in row, completed or not
    pub total_count: u32,
    pub completed_count: u32,

    /// Whole percentage of check-ins that were completed
    pub completion_rate: u32,

    pub current_streak: u32,
    pub longest_streak: u32,

    /// Most recent completed check-in date (YYYY-MM-DD)
    pub last_checkin: Option<String>,
}

/// A tracked habit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub archived: bool,
    pub created_at: String,
    pub stats: HabitStats,
}

/// Request payload for creating a habit
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
}

/// Request payload for checking a habit in
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CheckinRequest {
    /// YYYY-MM-DD; defaults to today
    pub date: Option<String>,

    /// Defaults to true
    pub completed: Option<bool>,

    #[validate(length(max = 500, message = "Note cannot exceed 500 characters"))]
    pub note: Option<String>,
}

/// One day's check-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HabitCheckin {
    pub habit_id: String,

    /// YYYY-MM-DD
    pub date: String,

    pub completed: bool,
    pub note: Option<String>,
    pub created_at: String,
}
