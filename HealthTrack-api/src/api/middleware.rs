//! Bearer authentication and response hardening

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use health_track_domain::auth::logging::log_token_validation;
use health_track_domain::auth::{AuthUser, TokenService};

use crate::api::error::ErrorResponse;

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(req: &Request) -> Result<&str, &'static str> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or("Authorization header does not contain Bearer token")
}

/// Authentication middleware for protected routes.
///
/// A valid access token puts an [`AuthUser`] and its claims into the request
/// extensions. Anything else is answered with 401.
pub async fn require_auth(State(tokens): State<Arc<TokenService>>, mut req: Request, next: Next) -> Response {
    let started = Instant::now();
    let resource = req.uri().path().to_string();

    let token = match bearer_token(&req) {
        Ok(token) => token,
        Err(reason) => {
            debug!("{} for {}", reason, resource);
            log_token_validation(None, &resource, false, Some(reason));
            return ErrorResponse::unauthorized(reason).into_response();
        }
    };

    match tokens.validate_access_token(token) {
        Ok(claims) => {
            debug!(
                "Token validated for user {} in {}ms",
                claims.sub,
                started.elapsed().as_millis()
            );
            log_token_validation(Some(&claims.sub), &resource, true, None);

            let user = AuthUser::from(claims.clone());
            req.extensions_mut().insert(claims);
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected bearer token for {}: {}", resource, e);
            log_token_validation(None, &resource, false, Some(&e.to_string()));
            ErrorResponse::unauthorized(e.to_string()).into_response()
        }
    }
}

/// Apply CORS, security headers and request tracing to the whole application
pub fn configure_security(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ));

    app.layer(cors)
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
}
