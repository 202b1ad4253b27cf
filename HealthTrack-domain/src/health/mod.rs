//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{error, warn};

use health_track_data::database::DatabasePool;

/// A database round trip slower than this marks the database as degraded
pub const SLOW_DATABASE_THRESHOLD: Duration = Duration::from_millis(500);

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Overall status is the worst component status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    ///
    /// - `Ok(true)` if the database is fully operational
    /// - `Ok(false)` if it answers but slowly
    /// - `Err` if it is unavailable
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service backed by the shared connection pool
#[derive(Debug, Clone)]
pub struct DatabaseHealthService {
    pool: DatabasePool,
}

impl DatabaseHealthService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for DatabaseHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let connection_info = self.pool.connection_info().ok();

        let database = match self.check_database_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: connection_info,
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some(format!(
                    "Database is experiencing high latency ({})",
                    connection_info.unwrap_or_default()
                )),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let mut components = HashMap::new();
        components.insert("database".to_string(), database);
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        let started = Instant::now();
        if let Err(e) = self.pool.ping() {
            error!("Database health check failed: {}", e);
            return Err(format!("Database connection error: {}", e));
        }

        let elapsed = started.elapsed();
        if elapsed > SLOW_DATABASE_THRESHOLD {
            warn!("Database health check took {:?}", elapsed);
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let service = DatabaseHealthService::new(DatabasePool::in_memory().unwrap());
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        let database = &health.components["database"];
        assert_eq!(database.status, ComponentStatus::Healthy);
        assert!(database.details.as_deref().unwrap_or("").contains("in-memory"));
        assert!(health.components.contains_key("api"));
    }

    #[test]
    fn test_worst_component_wins() {
        let mut components = HashMap::new();
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: ComponentStatus::Degraded,
                details: None,
            },
        );
        assert_eq!(SystemHealth::from_components(components.clone()).status, SystemStatus::Degraded);

        components.insert(
            "cache".to_string(),
            HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some("down".to_string()),
            },
        );
        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Unhealthy);
    }
}
