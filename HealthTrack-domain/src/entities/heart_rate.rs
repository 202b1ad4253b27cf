use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// What the wearer was doing when the heart rate was taken
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HeartRateContext {
    Resting,
    Active,
    Sleep,
}

impl HeartRateContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeartRateContext::Resting => "resting",
            HeartRateContext::Active => "active",
            HeartRateContext::Sleep => "sleep",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "resting" => Some(HeartRateContext::Resting),
            "active" => Some(HeartRateContext::Active),
            "sleep" => Some(HeartRateContext::Sleep),
            _ => None,
        }
    }
}

/// Heart rate category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HeartRateCategory {
    /// Below 60 bpm
    Low,
    /// 60 to 100 bpm
    Normal,
    /// Above 100 bpm
    High,
}

impl HeartRateCategory {
    pub fn label(&self) -> &'static str {
        match self {
            HeartRateCategory::Low => "偏慢",
            HeartRateCategory::Normal => "正常",
            HeartRateCategory::High => "偏快",
        }
    }
}

/// Domain model for a heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HeartRateReading {
    pub id: String,

    /// Beats per minute
    pub bpm: u16,

    pub context: Option<HeartRateContext>,
    pub notes: Option<String>,

    /// When the reading was taken (RFC 3339, UTC)
    pub timestamp: String,

    pub device_id: Option<String>,

    /// `manual` or the provider the reading was imported from
    pub source: String,

    pub category: HeartRateCategory,
    pub category_label: String,
}

/// Request payload for logging a heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateHeartRateRequest {
    #[validate(range(min = 20, max = 250, message = "Heart rate must be between 20 and 250"))]
    pub bpm: u16,

    pub context: Option<HeartRateContext>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// Defaults to the current time
    pub timestamp: Option<String>,

    pub device_id: Option<String>,
}

/// Heart rate statistics over a period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HeartRateInsights {
    pub avg_bpm: f64,
    pub min_bpm: u16,
    pub max_bpm: u16,
    pub reading_count: usize,

    /// Category of the average
    pub category: HeartRateCategory,
    pub category_label: String,

    pub period_days: u32,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_round_trips_through_storage_form() {
        for context in [HeartRateContext::Resting, HeartRateContext::Active, HeartRateContext::Sleep] {
            assert_eq!(HeartRateContext::parse(context.as_str()), Some(context));
        }
        assert_eq!(HeartRateContext::parse("running"), None);
    }

    #[test]
    fn test_bpm_range() {
        let mut request = CreateHeartRateRequest {
            bpm: 72,
            context: None,
            notes: None,
            timestamp: None,
            device_id: None,
        };
        assert!(request.validate().is_ok());
        request.bpm = 300;
        assert!(request.validate().is_err());
    }
}
