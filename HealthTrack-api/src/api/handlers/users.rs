use axum::extract::State;
use axum::{Extension, Json};
use tracing::instrument;

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::user::{UpdateProfileRequest, User};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::ApiJson;
use crate::api::state::UserServiceRef;

/// Get the signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_profile(
    State(service): State<UserServiceRef>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    Ok(Json(service.get_profile(&user.user_id).await?))
}

/// Update name, gender, birth date or height. Omitted fields are unchanged.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn update_profile(
    State(service): State<UserServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(service.update_profile(&user.user_id, request).await?))
}
