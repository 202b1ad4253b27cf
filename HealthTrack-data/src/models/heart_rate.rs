use serde::{Deserialize, Serialize};

/// Storage model for a heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartRateReading {
    pub id: String,
    pub user_id: String,

    /// Beats per minute
    pub bpm: u16,

    /// Measurement context (resting, active, sleep)
    pub context: Option<String>,

    pub notes: Option<String>,

    /// When the reading was taken (RFC 3339, UTC)
    pub timestamp: String,

    pub device_id: Option<String>,

    /// `manual` or the provider code the reading was imported from
    pub source: String,
}

/// Input data for inserting a heart rate reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHeartRateReading {
    pub user_id: String,
    pub bpm: u16,
    pub context: Option<String>,
    pub notes: Option<String>,
    pub timestamp: String,
    pub device_id: Option<String>,
    pub source: String,
}
