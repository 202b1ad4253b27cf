// Repository module structure
pub mod errors;
mod query;

mod blood_pressure;
mod device;
mod diet;
mod goal;
mod habit;
mod heart_rate;
mod recommendation;
mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use query::RecordQuery;

pub use blood_pressure::{BloodPressureRepositoryTrait, SqliteBloodPressureRepository};
pub use device::{DeviceCredentialRepositoryTrait, SqliteDeviceCredentialRepository};
pub use diet::{DietRepositoryTrait, SqliteDietRepository};
pub use goal::{GoalRepositoryTrait, SqliteGoalRepository};
pub use habit::{HabitRepositoryTrait, SqliteHabitRepository};
pub use heart_rate::{HeartRateRepositoryTrait, SqliteHeartRateRepository};
pub use recommendation::{RecommendationRepositoryTrait, SqliteRecommendationRepository};
pub use user::{SqliteUserRepository, UserRepositoryTrait};

/// Current time in the RFC 3339 UTC form every table stores
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
