pub mod analysis;
pub mod auth;
pub mod blood_pressure;
pub mod devices;
pub mod diet;
pub mod goals;
pub mod habits;
pub mod health;
pub mod heart_rate;
pub mod recommendations;
pub mod users;

pub use health::health_check;
