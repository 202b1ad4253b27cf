use serde::{Deserialize, Serialize};

/// Storage model for a blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodPressureReading {
    /// Unique identifier for the reading
    pub id: String,

    /// Owner of the reading
    pub user_id: String,

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

    /// `manual` or the provider code the reading was imported from
    pub source: String,
}

/// Input data for inserting a blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBloodPressureReading {
    pub user_id: String,
    pub systolic: u16,
    pub diastolic: u16,
    pub pulse: Option<u16>,
    pub notes: Option<String>,
    pub timestamp: String,
    pub position: Option<String>,
    pub arm: Option<String>,
    pub device_id: Option<String>,
    pub source: String,
}
