use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::{info, instrument};

use health_track_domain::auth::AuthUser;
use health_track_domain::entities::device::{
    ConnectDeviceRequest, DeviceCredential, DeviceProvider, SyncReport, SyncRequest,
};

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::state::DeviceServiceRef;

/// Connected providers. Secrets are never returned.
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    responses((status = 200, description = "Connected providers", body = [DeviceCredential])),
    security(("bearer" = [])),
    tag = "devices"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_devices(
    State(service): State<DeviceServiceRef>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<DeviceCredential>>> {
    Ok(Json(service.list(&user.user_id).await?))
}

/// Connect a provider, replacing any stored credential for it
#[utoipa::path(
    put,
    path = "/api/v1/devices/{provider}",
    params(("provider" = DeviceProvider, Path, description = "garmin, huawei or apple_health")),
    request_body = ConnectDeviceRequest,
    responses(
        (status = 200, description = "Provider connected", body = DeviceCredential),
        (status = 400, description = "Invalid request or unknown provider", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "devices"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn connect_device(
    State(service): State<DeviceServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(provider): ApiPath<DeviceProvider>,
    ApiJson(request): ApiJson<ConnectDeviceRequest>,
) -> ApiResult<Json<DeviceCredential>> {
    let credential = service.connect(&user.user_id, provider, request).await?;
    info!("Device provider {} connected", provider);
    Ok(Json(credential))
}

#[utoipa::path(
    delete,
    path = "/api/v1/devices/{provider}",
    params(("provider" = DeviceProvider, Path, description = "garmin, huawei or apple_health")),
    responses(
        (status = 204, description = "Provider disconnected"),
        (status = 404, description = "Provider not connected", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "devices"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn disconnect_device(
    State(service): State<DeviceServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(provider): ApiPath<DeviceProvider>,
) -> ApiResult<StatusCode> {
    service.disconnect(&user.user_id, provider).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Import samples already fetched from the provider.
/// Duplicates and out-of-range samples are counted, not stored.
#[utoipa::path(
    post,
    path = "/api/v1/devices/{provider}/sync",
    params(("provider" = DeviceProvider, Path, description = "garmin, huawei or apple_health")),
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Import report", body = SyncReport),
        (status = 404, description = "Provider not connected", body = ErrorResponse),
        (status = 500, description = "Stored credential could not be decrypted", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "devices"
)]
#[instrument(skip(service, user, request), fields(user_id = %user.user_id))]
pub async fn sync_device(
    State(service): State<DeviceServiceRef>,
    Extension(user): Extension<AuthUser>,
    ApiPath(provider): ApiPath<DeviceProvider>,
    ApiJson(request): ApiJson<SyncRequest>,
) -> ApiResult<Json<SyncReport>> {
    Ok(Json(service.sync(&user.user_id, provider, request).await?))
}
