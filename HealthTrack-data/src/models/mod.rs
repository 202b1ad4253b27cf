// Data storage models
pub mod blood_pressure;
pub mod device;
pub mod diet;
pub mod goal;
pub mod habit;
pub mod heart_rate;
pub mod recommendation;
pub mod user;
