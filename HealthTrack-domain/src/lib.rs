// HealthTrack Domain
// This crate contains the business logic for the HealthTrack application

// Services that implement business logic
pub mod services;

// Authentication and password hashing
pub mod auth;

// Domain entities
pub mod entities;

// Shared service error type
pub mod error;

// Advice providers (rules and LLM)
pub mod advice;

// Credential encryption
pub mod security;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use health_track_data::database;

pub use error::ServiceError;
