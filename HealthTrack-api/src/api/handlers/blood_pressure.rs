use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::blood_pressure::{
    BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest,
};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::BloodPressureServiceRef;
use crate::entities::{BloodPressurePage, HistoryQueryParams, InsightsQueryParams, PaginatedResponse};

const BASE_URL: &str = "/api/v1/bloodpressure";

/// Record a blood pressure reading
#[utoipa::path(
    post,
    path = "/api/v1/bloodpressure",
    request_body = CreateBloodPressureRequest,
    responses(
        (status = 201, description = "Blood pressure reading created", body = BloodPressureReading),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "blood_pressure"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn create_blood_pressure(
    State(service): State<BloodPressureServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateBloodPressureRequest>,
) -> ApiResult<impl IntoResponse> {
    let reading = service.create_reading(&user.user_id, request).await?;
    info!("Blood pressure reading created with ID: {}", reading.id);
    Ok((StatusCode::CREATED, Json(reading)))
}

/// Get paginated blood pressure history
#[utoipa::path(
    get,
    path = "/api/v1/bloodpressure",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Blood pressure history retrieved", body = BloodPressurePage),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "blood_pressure"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_blood_pressure_history(
    State(service): State<BloodPressureServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<HistoryQueryParams>,
) -> ApiResult<Json<PaginatedResponse<BloodPressureReading>>> {
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

/// Get blood pressure insights and analysis
#[utoipa::path(
    get,
    path = "/api/v1/bloodpressure/insights",
    params(InsightsQueryParams),
    responses(
        (status = 200, description = "Blood pressure insights generated", body = BloodPressureInsights),
        (status = 400, description = "Invalid timeframe", body = ErrorResponse),
        (status = 404, description = "No readings in the timeframe", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "blood_pressure"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_blood_pressure_insights(
    State(service): State<BloodPressureServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<InsightsQueryParams>,
) -> ApiResult<Json<BloodPressureInsights>> {
    Ok(Json(service.get_insights(&user.user_id, params.timeframe).await?))
}

/// Get a single blood pressure reading by ID
#[utoipa::path(
    get,
    path = "/api/v1/bloodpressure/{id}",
    params(("id" = String, Path, description = "Blood pressure reading ID")),
    responses(
        (status = 200, description = "Blood pressure reading found", body = BloodPressureReading),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "blood_pressure"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_blood_pressure(
    State(service): State<BloodPressureServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<BloodPressureReading>> {
    Ok(Json(service.get_reading_by_id(&user.user_id, &id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bloodpressure/{id}",
    params(("id" = String, Path, description = "Blood pressure reading ID")),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "blood_pressure"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_blood_pressure(
    State(service): State<BloodPressureServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    service.delete_reading(&user.user_id, &id).await?;
    info!("Blood pressure reading deleted: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
