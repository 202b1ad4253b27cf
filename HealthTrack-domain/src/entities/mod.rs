// Domain entities and value objects
pub mod analysis;
pub mod blood_pressure;
pub mod common;
pub mod conversions;
pub mod device;
pub mod diet;
pub mod goal;
pub mod habit;
pub mod heart_rate;
pub mod recommendation;
pub mod user;

// Re-export common types for easier imports
pub use blood_pressure::{
    BloodPressureCategory, BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest,
};
pub use common::HistoryFilter;
pub use heart_rate::{CreateHeartRateRequest, HeartRateCategory, HeartRateInsights, HeartRateReading};
