use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::habit::{CheckinRequest, CreateHabitRequest, Habit, HabitCheckin, HabitStats};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::HabitServiceRef;
use crate::entities::{ArchiveHabitRequest, CheckinRangeParams, HabitListParams};

#[utoipa::path(
    get,
    path = "/api/v1/habits",
    params(HabitListParams),
    responses((status = 200, description = "Habits with stats", body = [Habit])),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_habits(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<HabitListParams>,
) -> ApiResult<Json<Vec<Habit>>> {
    Ok(Json(service.list_habits(&user.user_id, params.include_archived).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/habits",
    request_body = CreateHabitRequest,
    responses(
        (status = 201, description = "Habit created", body = Habit),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn create_habit(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateHabitRequest>,
) -> ApiResult<impl IntoResponse> {
    let habit = service.create_habit(&user.user_id, request).await?;
    info!("Habit created with ID: {}", habit.id);
    Ok((StatusCode::CREATED, Json(habit)))
}

#[utoipa::path(
    get,
    path = "/api/v1/habits/{id}",
    params(("id" = String, Path, description = "Habit ID")),
    responses(
        (status = 200, description = "Habit found", body = Habit),
        (status = 404, description = "Habit not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_habit(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Habit>> {
    Ok(Json(service.get_habit(&user.user_id, &id).await?))
}

/// Archive or restore a habit. Archived habits keep their check-ins.
#[utoipa::path(
    put,
    path = "/api/v1/habits/{id}/archive",
    params(("id" = String, Path, description = "Habit ID")),
    request_body = ArchiveHabitRequest,
    responses(
        (status = 200, description = "Habit updated", body = Habit),
        (status = 404, description = "Habit not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn archive_habit(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<ArchiveHabitRequest>,
) -> ApiResult<Json<Habit>> {
    Ok(Json(service.set_archived(&user.user_id, &id, request.archived).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/habits/{id}",
    params(("id" = String, Path, description = "Habit ID")),
    responses(
        (status = 204, description = "Habit and its check-ins deleted"),
        (status = 404, description = "Habit not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_habit(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    service.delete_habit(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a habit in for a day. Checking the same day again replaces it.
#[utoipa::path(
    post,
    path = "/api/v1/habits/{id}/checkins",
    params(("id" = String, Path, description = "Habit ID")),
    request_body = CheckinRequest,
    responses(
        (status = 201, description = "Check-in stored", body = HabitCheckin),
        (status = 400, description = "Invalid or future date", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn check_in(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<CheckinRequest>,
) -> ApiResult<impl IntoResponse> {
    let checkin = service.check_in(&user.user_id, &id, request).await?;
    Ok((StatusCode::CREATED, Json(checkin)))
}

#[utoipa::path(
    get,
    path = "/api/v1/habits/{id}/checkins",
    params(("id" = String, Path, description = "Habit ID"), CheckinRangeParams),
    responses(
        (status = 200, description = "Check-ins, oldest first", body = [HabitCheckin]),
        (status = 404, description = "Habit not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_checkins(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<CheckinRangeParams>,
) -> ApiResult<Json<Vec<HabitCheckin>>> {
    Ok(Json(
        service
            .list_checkins(&user.user_id, &id, params.start_date, params.end_date)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/habits/{id}/stats",
    params(("id" = String, Path, description = "Habit ID")),
    responses(
        (status = 200, description = "Completion rate and streaks", body = HabitStats),
        (status = 404, description = "Habit not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "habits"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_habit_stats(
    State(service): State<HabitServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<HabitStats>> {
    Ok(Json(service.get_stats(&user.user_id, &id).await?))
}
