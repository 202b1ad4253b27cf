use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_track_domain::entities::diet::{DailyDietSummary, DietOverview};

/// Per-day diet totals plus averages over the period
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DietSummaryResponse {
    pub period_days: u32,

    /// Oldest day first; days without records are omitted
    pub daily: Vec<DailyDietSummary>,

    /// Absent when nothing was logged in the period
    pub overview: Option<DietOverview>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchiveHabitRequest {
    pub archived: bool,
}
