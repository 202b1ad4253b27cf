use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::blood_pressure::BloodPressureInsights;
use super::diet::DietOverview;
use super::goal::Goal;
use super::habit::Habit;
use super::heart_rate::HeartRateInsights;

/// Cross-record health report for one user. Sections without data are `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthAnalysis {
    pub period_days: u32,
    pub generated_at: DateTime<Utc>,
    pub blood_pressure: Option<BloodPressureInsights>,
    pub heart_rate: Option<HeartRateInsights>,
    pub diet: Option<DietOverview>,

    /// Active goals
    pub goals: Vec<Goal>,

    /// Unarchived habits with stats
    pub habits: Vec<Habit>,
}

impl HealthAnalysis {
    /// Whether no section holds any data
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.is_none()
            && self.heart_rate.is_none()
            && self.diet.is_none()
            && self.goals.is_empty()
            && self.habits.is_empty()
    }
}
