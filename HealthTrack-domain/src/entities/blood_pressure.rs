use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressureReading {
    /// Unique identifier for the reading
    pub id: String,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    pub pulse: Option<u16>,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was taken (RFC 3339, UTC)
    pub timestamp: String,

    /// Optional position (e.g., sitting, standing)
    pub position: Option<String>,

    /// Optional arm used (left or right)
    pub arm: Option<String>,

    /// Optional device ID used for measurement
    pub device_id: Option<String>,

    /// `manual` or the provider the reading was imported from
    pub source: String,

    /// Category of this single reading
    pub category: BloodPressureCategory,

    /// Display label of the category
    pub category_label: String,
}

/// Request payload for creating a new blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Pulse must be between 20 and 250"))]
    pub pulse: Option<u16>,

    /// Optional notes about the reading
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// When the reading was taken. Defaults to the current time.
    pub timestamp: Option<String>,

    /// Optional position during measurement (e.g., sitting, standing)
    pub position: Option<String>,

    /// Optional arm used for measurement (left or right)
    pub arm: Option<String>,

    /// Optional device ID used for measurement
    pub device_id: Option<String>,
}

/// Blood pressure category, graded by the stricter of the two pressures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureCategory {
    /// Systolic < 90 or diastolic < 60
    Low,

    /// Below 120/80
    Normal,

    /// Systolic 120-139 or diastolic 80-89
    HighNormal,

    /// Systolic 140-159 or diastolic 90-99
    Grade1Hypertension,

    /// Systolic 160-179 or diastolic 100-109
    Grade2Hypertension,

    /// Systolic ≥ 180 or diastolic ≥ 110
    Grade3Hypertension,
}

impl BloodPressureCategory {
    /// Display label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            BloodPressureCategory::Low => "偏低",
            BloodPressureCategory::Normal => "正常",
            BloodPressureCategory::HighNormal => "正常偏高",
            BloodPressureCategory::Grade1Hypertension => "1级高血压",
            BloodPressureCategory::Grade2Hypertension => "2级高血压",
            BloodPressureCategory::Grade3Hypertension => "3级高血压",
        }
    }

    /// Whether the category is any grade of hypertension
    pub fn is_hypertension(&self) -> bool {
        matches!(
            self,
            BloodPressureCategory::Grade1Hypertension
                | BloodPressureCategory::Grade2Hypertension
                | BloodPressureCategory::Grade3Hypertension
        )
    }
}

impl std::fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Blood pressure reading insights and analytics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressureInsights {
    /// Average systolic reading over the analysis period
    pub avg_systolic: f64,

    /// Average diastolic reading over the analysis period
    pub avg_diastolic: f64,

    /// Average pulse rate over the analysis period (if available)
    pub avg_pulse: Option<f64>,

    /// Highest recorded systolic reading during the period
    pub max_systolic: u16,

    /// Highest recorded diastolic reading during the period
    pub max_diastolic: u16,

    /// Lowest recorded systolic reading during the period
    pub min_systolic: u16,

    /// Lowest recorded diastolic reading during the period
    pub min_diastolic: u16,

    /// Blood pressure category based on average readings
    pub category: BloodPressureCategory,

    /// Display label of `category`
    pub category_label: String,

    /// Readings in the period that fell in the highest hypertension grade
    pub crisis_count: usize,

    /// Number of readings analyzed
    pub reading_count: usize,

    /// Analysis period in days
    pub period_days: u32,

    /// Timestamp of the analysis
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(systolic: u16, diastolic: u16) -> CreateBloodPressureRequest {
        CreateBloodPressureRequest {
            systolic,
            diastolic,
            pulse: Some(72),
            notes: None,
            timestamp: None,
            position: None,
            arm: None,
            device_id: None,
        }
    }

    #[test]
    fn test_request_ranges() {
        assert!(request(120, 80).validate().is_ok());
        assert!(request(350, 80).validate().is_err());
        assert!(request(120, 10).validate().is_err());

        let mut long_notes = request(120, 80);
        long_notes.notes = Some("x".repeat(1001));
        assert!(long_notes.validate().is_err());
    }

    #[test]
    fn test_category_serializes_in_snake_case() {
        let json = serde_json::to_string(&BloodPressureCategory::Grade1Hypertension).unwrap();
        assert_eq!(json, "\"grade1_hypertension\"");
        assert_eq!(BloodPressureCategory::HighNormal.label(), "正常偏高");
        assert!(BloodPressureCategory::Grade3Hypertension.is_hypertension());
        assert!(!BloodPressureCategory::HighNormal.is_hypertension());
    }
}
