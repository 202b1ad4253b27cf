// HealthTrack-api lib.rs
//
// HTTP surface of HealthTrack: the axum application, its OpenAPI document,
// the public wire entities and a typed REST client.

// Public modules
pub mod api;
pub mod client;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::{create_application, AppState};
