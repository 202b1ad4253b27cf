use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use health_track_domain::health::{ComponentStatus as DomainComponentStatus, HealthComponent, SystemStatus};

use crate::api::state::HealthServiceRef;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
    /// Value of `APP_ENV`
    pub environment: String,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub database: ComponentHealthStatus,
    pub api: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time for uptime reporting. Later calls are no-ops.
pub fn initialize_server_start_time() {
    let _ = SERVER_START_TIME.get_or_init(unix_now);
}

fn map_component(component: Option<&HealthComponent>) -> ComponentHealthStatus {
    match component {
        Some(component) => ComponentHealthStatus {
            status: map_component_status(component.status).to_string(),
            message: component.details.clone(),
        },
        None => ComponentHealthStatus {
            status: "ok".to_string(),
            message: None,
        },
    }
}

fn map_component_status(status: DomainComponentStatus) -> &'static str {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(State(health_service): State<HealthServiceRef>) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|start| now.saturating_sub(*start));
    let system_health = health_service.get_system_health().await;

    let (status, code) = match system_health.status {
        SystemStatus::Healthy => ("ok", StatusCode::OK),
        SystemStatus::Degraded => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
        SystemStatus::Unhealthy => ("error", StatusCode::INTERNAL_SERVER_ERROR),
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            database: map_component(system_health.components.get("database")),
            api: map_component(system_health.components.get("api")),
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use health_track_data::database::DatabasePool;
    use health_track_domain::health::DatabaseHealthService;

    #[tokio::test]
    async fn test_health_check_response() {
        initialize_server_start_time();
        let service: HealthServiceRef = Arc::new(DatabaseHealthService::new(DatabasePool::in_memory().unwrap()));

        let response = health_check(State(service)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_component_status_mapping() {
        assert_eq!(map_component_status(DomainComponentStatus::Healthy), "ok");
        assert_eq!(map_component_status(DomainComponentStatus::Degraded), "degraded");
        assert_eq!(map_component_status(DomainComponentStatus::Unhealthy), "error");
    }
}
