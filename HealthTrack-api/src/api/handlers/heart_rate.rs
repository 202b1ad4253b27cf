use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::heart_rate::{CreateHeartRateRequest, HeartRateInsights, HeartRateReading};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::HeartRateServiceRef;
use crate::entities::{HeartRatePage, HistoryQueryParams, InsightsQueryParams, PaginatedResponse};

const BASE_URL: &str = "/api/v1/heartrate";

#[utoipa::path(
    post,
    path = "/api/v1/heartrate",
    request_body = CreateHeartRateRequest,
    responses(
        (status = 201, description = "Heart rate reading created", body = HeartRateReading),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "heart_rate"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn create_heart_rate(
    State(service): State<HeartRateServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateHeartRateRequest>,
) -> ApiResult<impl IntoResponse> {
    let reading = service.create_reading(&user.user_id, request).await?;
    info!("Heart rate reading created with ID: {}", reading.id);
    Ok((StatusCode::CREATED, Json(reading)))
}

#[utoipa::path(
    get,
    path = "/api/v1/heartrate",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Heart rate history retrieved", body = HeartRatePage),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "heart_rate"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_heart_rate_history(
    State(service): State<HeartRateServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<HistoryQueryParams>,
) -> ApiResult<Json<PaginatedResponse<HeartRateReading>>> {
    let filter = params.to_filter()?;
    let (readings, total_count) = service.get_filtered_readings(&user.user_id, &filter).await?;

    Ok(Json(PaginatedResponse::page(
        readings,
        total_count,
        filter.page_size(),
        filter.offset.unwrap_or(0),
        BASE_URL,
        &params,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/heartrate/insights",
    params(InsightsQueryParams),
    responses(
        (status = 200, description = "Heart rate insights generated", body = HeartRateInsights),
        (status = 404, description = "No readings in the timeframe", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "heart_rate"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_heart_rate_insights(
    State(service): State<HeartRateServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<InsightsQueryParams>,
) -> ApiResult<Json<HeartRateInsights>> {
    Ok(Json(service.get_insights(&user.user_id, params.timeframe).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/heartrate/{id}",
    params(("id" = String, Path, description = "Heart rate reading ID")),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 404, description = "Heart rate reading not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "heart_rate"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_heart_rate(
    State(service): State<HeartRateServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    service.delete_reading(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
