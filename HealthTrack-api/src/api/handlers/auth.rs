use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::user::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::ApiJson;
use crate::api::state::UserServiceRef;

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(service, request))]
pub async fn register(
    State(service): State<UserServiceRef>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = service.register(request).await?;
    info!("User registered: {}", response.user.id);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with email and password.
/// Use the returned access_token in the Authorization header as 'Bearer {token}'.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(service, request))]
pub async fn login(
    State(service): State<UserServiceRef>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(service.login(request).await?))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = AuthResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(service, request))]
pub async fn refresh(
    State(service): State<UserServiceRef>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(service.refresh(request).await?))
}

/// Revoke the access token used for this request
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn logout(
    State(service): State<UserServiceRef>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    service.logout(&user.claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
