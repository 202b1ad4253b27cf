use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tracing::debug;

use crate::api::handlers::{
    analysis, auth, blood_pressure, devices, diet, goals, habits, health, heart_rate, recommendations, users,
};
use crate::api::middleware::{configure_security, require_auth};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Define specific routes before parametrized routes to avoid conflicts
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/users/me", get(users::get_profile).put(users::update_profile))
        .route("/bloodpressure/insights", get(blood_pressure::get_blood_pressure_insights))
        .route(
            "/bloodpressure",
            get(blood_pressure::get_blood_pressure_history).post(blood_pressure::create_blood_pressure),
        )
        .route(
            "/bloodpressure/:id",
            get(blood_pressure::get_blood_pressure).delete(blood_pressure::delete_blood_pressure),
        )
        .route("/heartrate/insights", get(heart_rate::get_heart_rate_insights))
        .route(
            "/heartrate",
            get(heart_rate::get_heart_rate_history).post(heart_rate::create_heart_rate),
        )
        .route("/heartrate/:id", delete(heart_rate::delete_heart_rate))
        .route("/diet/summary", get(diet::get_diet_summary))
        .route("/diet", get(diet::get_diet_history).post(diet::create_diet_record))
        .route("/diet/:id", delete(diet::delete_diet_record))
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route("/goals/:id", get(goals::get_goal).delete(goals::delete_goal))
        .route("/goals/:id/progress", put(goals::update_goal_progress))
        .route("/goals/:id/status", put(goals::update_goal_status))
        .route("/habits", get(habits::list_habits).post(habits::create_habit))
        .route("/habits/:id", get(habits::get_habit).delete(habits::delete_habit))
        .route("/habits/:id/archive", put(habits::archive_habit))
        .route(
            "/habits/:id/checkins",
            get(habits::list_checkins).post(habits::check_in),
        )
        .route("/habits/:id/stats", get(habits::get_habit_stats))
        .route("/devices", get(devices::list_devices))
        .route(
            "/devices/:provider",
            put(devices::connect_device).delete(devices::disconnect_device),
        )
        .route("/devices/:provider/sync", post(devices::sync_device))
        .route("/analysis", get(analysis::get_analysis))
        .route("/recommendations", get(recommendations::list_recommendations))
        .route("/recommendations/generate", post(recommendations::generate_recommendation))
        .route_layer(middleware::from_fn_with_state(state.tokens.clone(), require_auth));

    debug!("Protected routes configured");

    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
        .merge(configure_swagger_routes());

    debug!("Swagger UI merged");

    let app = configure_security(app);

    // Initialize health check service startup time
    health::initialize_server_start_time();

    app
}
