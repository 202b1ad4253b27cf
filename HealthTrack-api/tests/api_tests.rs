use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use health_track_api::{create_application, AppState};
use health_track_data::database::DatabasePool;
use health_track_domain::auth::{TokenConfig, TokenService};
use health_track_domain::security::CredentialCipher;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn create_test_app() -> Router {
    initialize();
    let pool = DatabasePool::in_memory().expect("in-memory database");
    let tokens = Arc::new(TokenService::new(TokenConfig::new("integration-test-secret")));
    let cipher = CredentialCipher::derived_from("test", "integration-test-secret");
    create_application(AppState::new(pool, tokens, cipher, None))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register a user and return its access token
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": "correct-horse", "name": "Test User" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::GET, "/api/v1/bloodpressure", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, Method::GET, "/api/v1/goals", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_refresh_logout() {
    let app = create_test_app();
    register(&app, "flow@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "FLOW@example.com", "password": "another-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "flow@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "flow@example.com", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = login["access_token"].as_str().unwrap().to_string();
    let refresh = login["refresh_token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/api/v1/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "flow@example.com");

    // An access token is not accepted as a refresh token
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, refreshed) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let renewed = refreshed["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/api/v1/auth/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Only the presented token was revoked
    let (status, _) = send(&app, Method::GET, "/api/v1/users/me", Some(&renewed), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile() {
    let app = create_test_app();
    let token = register(&app, "profile@example.com").await;

    let (status, user) = send(
        &app,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "name": "Renamed", "gender": "female", "birth_date": "1990-04-12", "height_cm": 168.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Renamed");
    assert_eq!(user["birth_date"], "1990-04-12");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/users/me",
        Some(&token),
        Some(json!({ "birth_date": "2999-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blood_pressure_flow() {
    let app = create_test_app();
    let token = register(&app, "bp@example.com").await;

    for (systolic, diastolic) in [(118, 76), (135, 85), (142, 92)] {
        let (status, reading) = send(
            &app,
            Method::POST,
            "/api/v1/bloodpressure",
            Some(&token),
            Some(json!({ "systolic": systolic, "diastolic": diastolic, "pulse": 70 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reading["systolic"], systolic);
    }

    let (status, page) = send(&app, Method::GET, "/api/v1/bloodpressure?limit=2", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert!(page["next"].as_str().unwrap().contains("offset=2"));
    assert!(page.get("previous").is_none());

    let (status, insights) = send(
        &app,
        Method::GET,
        "/api/v1/bloodpressure/insights?timeframe=7",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(insights["reading_count"], 3);

    let id = page["data"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/bloodpressure/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Another user cannot see the reading
    let other = register(&app, "other@example.com").await;
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/bloodpressure/{}", id), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/bloodpressure/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_validation_and_bad_requests() {
    let app = create_test_app();
    let token = register(&app, "invalid@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/bloodpressure",
        Some(&token),
        Some(json!({ "systolic": 400, "diastolic": 80 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/heartrate",
        Some(&token),
        Some(json!({ "bpm": "fast" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = send(&app, Method::GET, "/api/v1/bloodpressure?sort=sideways", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/heartrate/insights?timeframe=0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/v1/heartrate/insights", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "insufficient_data");
}

#[tokio::test]
async fn test_diet_summary() {
    let app = create_test_app();
    let token = register(&app, "diet@example.com").await;

    let (status, summary) = send(&app, Method::GET, "/api/v1/diet/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(summary["overview"].is_null());
    assert_eq!(summary["daily"].as_array().unwrap().len(), 0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/diet",
        Some(&token),
        Some(json!({ "meal_type": "lunch", "food_name": "Rice bowl", "calories": 650.0, "protein_g": 25.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, Method::GET, "/api/v1/diet/summary?days=7", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["period_days"], 7);
    assert_eq!(summary["daily"].as_array().unwrap().len(), 1);
    assert!(summary["overview"].is_object());
}

#[tokio::test]
async fn test_goal_lifecycle() {
    let app = create_test_app();
    let token = register(&app, "goals@example.com").await;

    let (status, goal) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(&token),
        Some(json!({ "title": "Walk more", "metric": "steps", "target_value": 10000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["status"], "active");
    let id = goal["id"].as_str().unwrap().to_string();

    let (status, goal) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/goals/{}/progress", id),
        Some(&token),
        Some(json!({ "current_value": 10500.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["status"], "completed");
    assert_eq!(goal["progress_percent"], 100.0);

    let (status, goals) = send(&app, Method::GET, "/api/v1/goals?status=completed", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goals.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/goals/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/goals/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_habit_checkins_and_stats() {
    let app = create_test_app();
    let token = register(&app, "habits@example.com").await;

    let (status, habit) = send(
        &app,
        Method::POST,
        "/api/v1/habits",
        Some(&token),
        Some(json!({ "name": "Stretch" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = habit["id"].as_str().unwrap().to_string();

    let (status, checkin) = send(
        &app,
        Method::POST,
        &format!("/api/v1/habits/{}/checkins", id),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(checkin["completed"], true);

    let (status, stats) = send(&app, Method::GET, &format!("/api/v1/habits/{}/stats", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["current_streak"], 1);
    assert_eq!(stats["completion_rate"], 100);

    let (status, checkins) = send(
        &app,
        Method::GET,
        &format!("/api/v1/habits/{}/checkins", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checkins.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/habits/{}/archive", id),
        Some(&token),
        Some(json!({ "archived": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, Method::GET, "/api/v1/habits", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
    let (_, listed) = send(&app, Method::GET, "/api/v1/habits?include_archived=true", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_device_connect_and_sync() {
    let app = create_test_app();
    let token = register(&app, "devices@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/devices/garmin/sync",
        Some(&token),
        Some(json!({ "samples": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, credential) = send(
        &app,
        Method::PUT,
        "/api/v1/devices/garmin",
        Some(&token),
        Some(json!({ "account": "runner", "secret": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(credential["provider"], "garmin");
    assert_eq!(credential["has_secret"], true);
    assert!(credential.get("secret").is_none());

    let (status, report) = send(
        &app,
        Method::POST,
        "/api/v1/devices/garmin/sync",
        Some(&token),
        Some(json!({ "samples": [
            { "kind": "blood_pressure", "systolic": 121, "diastolic": 79, "timestamp": "2024-03-01T08:00:00Z" },
            { "kind": "blood_pressure", "systolic": 121, "diastolic": 79, "timestamp": "2024-03-01T08:00:00Z" },
            { "kind": "heart_rate", "bpm": 64, "timestamp": "2024-03-01T08:05:00Z" },
            { "kind": "heart_rate", "bpm": 900, "timestamp": "2024-03-01T08:10:00Z" }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["blood_pressure_imported"], 1);
    assert_eq!(report["heart_rate_imported"], 1);
    assert_eq!(report["duplicates"], 1);
    assert_eq!(report["invalid"], 1);

    let (status, _) = send(&app, Method::PUT, "/api/v1/devices/fitbit", Some(&token), Some(json!({ "account": "a", "secret": "b" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/devices/garmin", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, devices) = send(&app, Method::GET, "/api/v1/devices", Some(&token), None).await;
    assert_eq!(devices.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_analysis_and_recommendations() {
    let app = create_test_app();
    let token = register(&app, "advice@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/bloodpressure",
        Some(&token),
        Some(json!({ "systolic": 150, "diastolic": 95 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, analysis) = send(&app, Method::GET, "/api/v1/analysis?days=14", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["period_days"], 14);
    assert!(analysis["blood_pressure"].is_object());
    assert!(analysis["heart_rate"].is_null());

    let (status, recommendation) = send(
        &app,
        Method::POST,
        "/api/v1/recommendations/generate",
        Some(&token),
        Some(json!({ "period_days": 14 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recommendation["source"], "rules");
    assert!(!recommendation["advice"].as_array().unwrap().is_empty());

    // The body is optional
    let (status, _) = send(&app, Method::POST, "/api/v1/recommendations/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, history) = send(&app, Method::GET, "/api/v1/recommendations?limit=1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app();
    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/devices/{provider}/sync"].is_object());
}
