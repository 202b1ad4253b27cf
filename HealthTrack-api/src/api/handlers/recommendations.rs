use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::recommendation::{GenerateRecommendationRequest, Recommendation};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::state::RecommendationServiceRef;
use crate::entities::RecommendationHistoryParams;

/// Previously generated advice, newest first
#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    params(RecommendationHistoryParams),
    responses((status = 200, description = "Advice history", body = [Recommendation])),
    security(("bearer" = [])),
    tag = "recommendations"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_recommendations(
    State(service): State<RecommendationServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<RecommendationHistoryParams>,
) -> ApiResult<Json<Vec<Recommendation>>> {
    Ok(Json(service.history(&user.user_id, params.limit).await?))
}

/// Analyze recent data and store new advice. The body is optional.
#[utoipa::path(
    post,
    path = "/api/v1/recommendations/generate",
    request_body(content = GenerateRecommendationRequest, description = "Optional, the period defaults to 30 days"),
    responses(
        (status = 201, description = "Advice generated", body = Recommendation),
        (status = 400, description = "Invalid period", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "recommendations"
)]
#[instrument(skip(service, user, body), fields(user_id = %user.user_id))]
pub async fn generate_recommendation(
    State(service): State<RecommendationServiceRef>,
    Extension(user): Extension<AuthUser>,
    body: Option<ApiJson<GenerateRecommendationRequest>>,
) -> ApiResult<impl IntoResponse> {
    let request = body.map(|ApiJson(request)| request).unwrap_or_default();
    let recommendation = service.generate(&user.user_id, request).await?;
    info!(
        "Generated {} advice lines from {:?}",
        recommendation.advice.len(),
        recommendation.source
    );
    Ok((StatusCode::CREATED, Json(recommendation)))
}
