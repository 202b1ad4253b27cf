use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::goal::{
    CreateGoalRequest, Goal, UpdateGoalProgressRequest, UpdateGoalStatusRequest,
};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::GoalServiceRef;
use crate::entities::GoalListParams;

#[utoipa::path(
    get,
    path = "/api/v1/goals",
    params(GoalListParams),
    responses(
        (status = 200, description = "Goals with progress", body = [Goal]),
        (status = 400, description = "Invalid status filter", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_goals(
    State(service): State<GoalServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<GoalListParams>,
) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(service.list_goals(&user.user_id, params.status).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = Goal),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn create_goal(
    State(service): State<GoalServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateGoalRequest>,
) -> ApiResult<impl IntoResponse> {
    let goal = service.create_goal(&user.user_id, request).await?;
    info!("Goal created with ID: {}", goal.id);
    Ok((StatusCode::CREATED, Json(goal)))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    responses(
        (status = 200, description = "Goal found", body = Goal),
        (status = 404, description = "Goal not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_goal(
    State(service): State<GoalServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(service.get_goal(&user.user_id, &id).await?))
}

/// Record a new current value. An active goal reaching its target is completed.
#[utoipa::path(
    put,
    path = "/api/v1/goals/{id}/progress",
    params(("id" = String, Path, description = "Goal ID")),
    request_body = UpdateGoalProgressRequest,
    responses(
        (status = 200, description = "Progress recorded", body = Goal),
        (status = 400, description = "Invalid value", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn update_goal_progress(
    State(service): State<GoalServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateGoalProgressRequest>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(
        service
            .update_progress(&user.user_id, &id, request.current_value)
            .await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/goals/{id}/status",
    params(("id" = String, Path, description = "Goal ID")),
    request_body = UpdateGoalStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Goal),
        (status = 404, description = "Goal not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn update_goal_status(
    State(service): State<GoalServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateGoalStatusRequest>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(service.update_status(&user.user_id, &id, request.status).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 404, description = "Goal not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_goal(
    State(service): State<GoalServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    service.delete_goal(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
