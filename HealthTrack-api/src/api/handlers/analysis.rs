use axum::extract::State;
use axum::{Extension, Json};
use tracing::instrument;

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::analysis::HealthAnalysis;

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::ApiQuery;
use crate::api::state::AnalysisServiceRef;
use crate::entities::PeriodQueryParams;

/// Combined report over the period. Sections without data are null.
#[utoipa::path(
    get,
    path = "/api/v1/analysis",
    params(PeriodQueryParams),
    responses(
        (status = 200, description = "Health analysis", body = HealthAnalysis),
        (status = 400, description = "Invalid period", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "analysis"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_analysis(
    State(service): State<AnalysisServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PeriodQueryParams>,
) -> ApiResult<Json<HealthAnalysis>> {
    Ok(Json(service.analyze(&user.user_id, params.days).await?))
}
