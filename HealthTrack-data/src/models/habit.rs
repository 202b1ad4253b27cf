use serde::{Deserialize, Serialize};

/// Storage model for a tracked habit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub archived: bool,
    pub created_at: String,
}

/// Input data for inserting a habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHabit {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A habit check-in for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitCheckin {
    pub habit_id: String,

    /// Calendar date (YYYY-MM-DD)
    pub checkin_date: String,

    pub completed: bool,
    pub note: Option<String>,
    pub created_at: String,
}
