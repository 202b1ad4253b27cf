use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use health_track_domain::entities::{
    analysis::HealthAnalysis,
    blood_pressure::{BloodPressureCategory, BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest},
    device::{
        ConnectDeviceRequest, DeviceConnectionStatus, DeviceCredential, DeviceProvider, DeviceSample, SyncReport,
        SyncRequest,
    },
    diet::{CreateDietRecordRequest, DailyDietSummary, DietOverview, DietRecord, MealType},
    goal::{CreateGoalRequest, Goal, GoalMetric, GoalStatus, UpdateGoalProgressRequest, UpdateGoalStatusRequest},
    habit::{CheckinRequest, CreateHabitRequest, Habit, HabitCheckin, HabitStats},
    heart_rate::{CreateHeartRateRequest, HeartRateCategory, HeartRateContext, HeartRateInsights, HeartRateReading},
    recommendation::{AdviceSource, GenerateRecommendationRequest, Recommendation},
    user::{AuthResponse, Gender, LoginRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest, User},
};

use crate::api::error::ErrorResponse;
use crate::api::handlers;
use crate::entities::{ArchiveHabitRequest, BloodPressurePage, DietRecordPage, DietSummaryResponse, HeartRatePage};

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer JWT scheme referenced by protected operations
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token from POST /api/v1/auth/login"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        handlers::health::health_check,

        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::users::get_profile,
        handlers::users::update_profile,

        handlers::blood_pressure::create_blood_pressure,
        handlers::blood_pressure::get_blood_pressure_history,
        handlers::blood_pressure::get_blood_pressure_insights,
        handlers::blood_pressure::get_blood_pressure,
        handlers::blood_pressure::delete_blood_pressure,

        handlers::heart_rate::create_heart_rate,
        handlers::heart_rate::get_heart_rate_history,
        handlers::heart_rate::get_heart_rate_insights,
        handlers::heart_rate::delete_heart_rate,

        handlers::diet::create_diet_record,
        handlers::diet::get_diet_history,
        handlers::diet::get_diet_summary,
        handlers::diet::delete_diet_record,

        handlers::goals::list_goals,
        handlers::goals::create_goal,
        handlers::goals::get_goal,
        handlers::goals::update_goal_progress,
        handlers::goals::update_goal_status,
        handlers::goals::delete_goal,

        handlers::habits::list_habits,
        handlers::habits::create_habit,
        handlers::habits::get_habit,
        handlers::habits::archive_habit,
        handlers::habits::delete_habit,
        handlers::habits::check_in,
        handlers::habits::list_checkins,
        handlers::habits::get_habit_stats,

        handlers::devices::list_devices,
        handlers::devices::connect_device,
        handlers::devices::disconnect_device,
        handlers::devices::sync_device,

        handlers::analysis::get_analysis,

        handlers::recommendations::list_recommendations,
        handlers::recommendations::generate_recommendation,
    ),
    components(
        schemas(
            ErrorResponse,
            handlers::health::HealthResponse,
            handlers::health::ComponentStatus,
            handlers::health::ComponentHealthStatus,

            User, Gender, RegisterRequest, LoginRequest, RefreshRequest, UpdateProfileRequest, AuthResponse,

            BloodPressureReading, CreateBloodPressureRequest, BloodPressureCategory, BloodPressureInsights,
            BloodPressurePage,
            HeartRateReading, CreateHeartRateRequest, HeartRateContext, HeartRateCategory, HeartRateInsights,
            HeartRatePage,
            DietRecord, CreateDietRecordRequest, MealType, DailyDietSummary, DietOverview, DietRecordPage,
            DietSummaryResponse,

            Goal, GoalMetric, GoalStatus, CreateGoalRequest, UpdateGoalProgressRequest, UpdateGoalStatusRequest,
            Habit, HabitStats, HabitCheckin, CreateHabitRequest, CheckinRequest, ArchiveHabitRequest,

            DeviceProvider, DeviceConnectionStatus, DeviceCredential, ConnectDeviceRequest, DeviceSample,
            SyncRequest, SyncReport,

            HealthAnalysis, Recommendation, AdviceSource, GenerateRecommendationRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration, login and token management"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "blood_pressure", description = "Blood pressure readings and insights"),
        (name = "heart_rate", description = "Heart rate readings and insights"),
        (name = "diet", description = "Meals and daily nutrition totals"),
        (name = "goals", description = "Health goals and progress"),
        (name = "habits", description = "Habits, daily check-ins and streaks"),
        (name = "devices", description = "Wearable provider connections and sync"),
        (name = "analysis", description = "Combined health analysis"),
        (name = "recommendations", description = "Generated health advice"),
    ),
    info(
        title = "HealthTrack API",
        version = "0.1.0",
        description = "API for tracking health metrics and providing insights",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthTrack API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "blood_pressure"));
        assert!(tags.iter().any(|tag| tag.name == "devices"));

        let paths = &openapi.paths.paths;
        for path in [
            "/health",
            "/api/v1/auth/login",
            "/api/v1/users/me",
            "/api/v1/bloodpressure",
            "/api/v1/bloodpressure/{id}",
            "/api/v1/bloodpressure/insights",
            "/api/v1/heartrate/insights",
            "/api/v1/diet/summary",
            "/api/v1/goals/{id}/progress",
            "/api/v1/habits/{id}/checkins",
            "/api/v1/devices/{provider}/sync",
            "/api/v1/analysis",
            "/api/v1/recommendations/generate",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
