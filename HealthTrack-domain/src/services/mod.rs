// Domain services
// This module contains business logic implementations.

pub mod analysis;
pub mod blood_pressure;
pub mod devices;
pub mod diet;
pub mod goals;
pub mod habits;
pub mod heart_rate;
pub mod insights;
pub mod progress;
pub mod recommendations;
pub mod users;

// Re-export service traits and implementations
pub use analysis::{AnalysisService, AnalysisServiceTrait};
pub use blood_pressure::{BloodPressureService, BloodPressureServiceTrait};
pub use devices::{DeviceService, DeviceServiceTrait};
pub use diet::{DietService, DietServiceTrait};
pub use goals::{GoalService, GoalServiceTrait};
pub use habits::{HabitService, HabitServiceTrait};
pub use heart_rate::{HeartRateService, HeartRateServiceTrait};
pub use recommendations::{RecommendationService, RecommendationServiceTrait};
pub use users::{UserService, UserServiceTrait};
