use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::diet::{CreateDietRecordRequest, DietRecord};
use health_track_domain::services::blood_pressure::DEFAULT_TIMEFRAME_DAYS;
use health_track_domain::ServiceError;

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::state::DietServiceRef;
use crate::entities::{DietRecordPage, DietSummaryResponse, HistoryQueryParams, PaginatedResponse, PeriodQueryParams};

const BASE_URL: &str = "/api/v1/diet";

#[utoipa::path(
    post,
    path = "/api/v1/diet",
    request_body = CreateDietRecordRequest,
    responses(
        (status = 201, description = "Diet record created", body = DietRecord),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "diet"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn create_diet_record(
    State(service): State<DietServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateDietRecordRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = service.create_record(&user.user_id, request).await?;
    info!("Diet record created with ID: {}", record.id);
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/diet",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Diet history retrieved", body = DietRecordPage),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "diet"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_diet_history(
    State(service): State<DietServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<HistoryQueryParams>,
) -> ApiResult<Json<PaginatedResponse<DietRecord>>> {
    let filter = params.to_filter()?;
    let (records, total_count) = service.get_filtered_records(&user.user_id, &filter).await?;

    Ok(Json(PaginatedResponse::page(
        records,
        total_count,
        filter.page_size(),
        filter.offset.unwrap_or(0),
        BASE_URL,
        &params,
    )))
}

/// Daily calorie and macro totals with period averages
#[utoipa::path(
    get,
    path = "/api/v1/diet/summary",
    params(PeriodQueryParams),
    responses(
        (status = 200, description = "Diet summary", body = DietSummaryResponse),
        (status = 400, description = "Invalid period", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "diet"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_diet_summary(
    State(service): State<DietServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PeriodQueryParams>,
) -> ApiResult<Json<DietSummaryResponse>> {
    let daily = service.daily_summary(&user.user_id, params.days).await?;

    let overview = match service.overview(&user.user_id, params.days).await {
        Ok(overview) => Some(overview),
        Err(ServiceError::InsufficientData(_)) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(DietSummaryResponse {
        period_days: params.days.unwrap_or(DEFAULT_TIMEFRAME_DAYS),
        daily,
        overview,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/diet/{id}",
    params(("id" = String, Path, description = "Diet record ID")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Diet record not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "diet"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_diet_record(
    State(service): State<DietServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    service.delete_record(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
