//! Typed client for the HealthTrack REST API
//!
//! Every call sends the stored access token as a bearer header. The first 401
//! clears the session and sends the user to the login route; further 401s stay
//! quiet until a login or registration succeeds again.

pub mod error;
pub mod session;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use health_track_domain::entities::{
    analysis::HealthAnalysis,
    blood_pressure::{BloodPressureInsights, BloodPressureReading, CreateBloodPressureRequest},
    device::{ConnectDeviceRequest, DeviceCredential, DeviceProvider, SyncReport, SyncRequest},
    diet::{CreateDietRecordRequest, DietRecord},
    goal::{CreateGoalRequest, Goal, GoalStatus, UpdateGoalProgressRequest, UpdateGoalStatusRequest},
    habit::{CheckinRequest, CreateHabitRequest, Habit, HabitCheckin, HabitStats},
    heart_rate::{CreateHeartRateRequest, HeartRateInsights, HeartRateReading},
    recommendation::{GenerateRecommendationRequest, Recommendation},
    user::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest, User},
};

use crate::api::error::ErrorResponse;
use crate::entities::{
    ArchiveHabitRequest, CheckinRangeParams, DietSummaryResponse, GoalListParams, HabitListParams,
    HistoryQueryParams, InsightsQueryParams, PaginatedResponse, PeriodQueryParams, RecommendationHistoryParams,
};

pub use error::ClientError;
pub use session::{InMemorySessionStore, LoginRedirect, Session, SessionStore};

/// Route handed to the redirect hook unless configured otherwise
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

const API_PREFIX: &str = "/api/v1";

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
    login_route: String,
    /// Cleared by the first 401, set again by a successful login or registration
    redirect_armed: AtomicBool,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>, redirect: Arc<dyn LoginRedirect>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            redirect,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            redirect_armed: AtomicBool::new(true),
        }
    }

    pub fn with_login_route(mut self, login_route: impl Into<String>) -> Self {
        self.login_route = login_route.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn session(&self) -> Option<Session> {
        self.session.load()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.load() {
            Some(session) => builder.bearer_auth(session.access_token),
            None => builder,
        }
    }

    /// Send and check the status. 401 clears the session and fires the redirect at most once.
    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear();
            if self.redirect_armed.swap(false, Ordering::SeqCst) {
                debug!("Session rejected, redirecting to {}", self.login_route);
                self.redirect.redirect(&self.login_route);
            }
            return Err(ClientError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let error = api_error(status, &body);
        warn!("Request failed: {}", error);
        Err(error)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.execute(builder).await?.json::<T>().await?)
    }

    async fn empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.execute(builder).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.json(self.request(Method::GET, path)).await
    }

    async fn get_query<T: DeserializeOwned, Q: Serialize>(&self, path: &str, query: &Q) -> Result<T, ClientError> {
        self.json(self.request(Method::GET, path).query(query)).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.json(self.request(method, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.empty(self.request(Method::DELETE, path)).await
    }

    fn start_session(&self, auth: &AuthResponse) {
        self.session.save(Session {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
        });
        self.redirect_armed.store(true, Ordering::SeqCst);
    }

    // Authentication

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self.send_json(Method::POST, "/auth/register", request).await?;
        self.start_session(&auth);
        Ok(auth)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.send_json(Method::POST, "/auth/login", &request).await?;
        self.start_session(&auth);
        Ok(auth)
    }

    /// Renew the access token with the stored refresh token
    pub async fn refresh(&self) -> Result<AuthResponse, ClientError> {
        let refresh_token = self
            .session
            .load()
            .and_then(|session| session.refresh_token)
            .ok_or(ClientError::Unauthorized)?;

        let request = RefreshRequest {
            refresh_token: refresh_token.clone(),
        };
        let auth: AuthResponse = self.send_json(Method::POST, "/auth/refresh", &request).await?;
        self.session.save(Session {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone().or(Some(refresh_token)),
        });
        Ok(auth)
    }

    /// Revoke the access token on the server and forget the session
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.empty(self.request(Method::POST, "/auth/logout")).await;
        self.session.clear();
        result
    }

    // Profile

    pub async fn me(&self) -> Result<User, ClientError> {
        self.get("/users/me").await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User, ClientError> {
        self.send_json(Method::PUT, "/users/me", request).await
    }

    // Blood pressure

    pub async fn create_blood_pressure(
        &self,
        request: &CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ClientError> {
        self.send_json(Method::POST, "/bloodpressure", request).await
    }

    pub async fn blood_pressure_history(
        &self,
        query: &HistoryQueryParams,
    ) -> Result<PaginatedResponse<BloodPressureReading>, ClientError> {
        self.get_query("/bloodpressure", query).await
    }

    pub async fn blood_pressure_insights(&self, timeframe: Option<u32>) -> Result<BloodPressureInsights, ClientError> {
        self.get_query("/bloodpressure/insights", &InsightsQueryParams { timeframe })
            .await
    }

    pub async fn get_blood_pressure(&self, id: &str) -> Result<BloodPressureReading, ClientError> {
        self.get(&format!("/bloodpressure/{}", urlencoding::encode(id))).await
    }

    pub async fn delete_blood_pressure(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/bloodpressure/{}", urlencoding::encode(id))).await
    }

    // Heart rate

    pub async fn create_heart_rate(&self, request: &CreateHeartRateRequest) -> Result<HeartRateReading, ClientError> {
        self.send_json(Method::POST, "/heartrate", request).await
    }

    pub async fn heart_rate_history(
        &self,
        query: &HistoryQueryParams,
    ) -> Result<PaginatedResponse<HeartRateReading>, ClientError> {
        self.get_query("/heartrate", query).await
    }

    pub async fn heart_rate_insights(&self, timeframe: Option<u32>) -> Result<HeartRateInsights, ClientError> {
        self.get_query("/heartrate/insights", &InsightsQueryParams { timeframe })
            .await
    }

    pub async fn delete_heart_rate(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/heartrate/{}", urlencoding::encode(id))).await
    }

    // Diet

    pub async fn create_diet_record(&self, request: &CreateDietRecordRequest) -> Result<DietRecord, ClientError> {
        self.send_json(Method::POST, "/diet", request).await
    }

    pub async fn diet_history(&self, query: &HistoryQueryParams) -> Result<PaginatedResponse<DietRecord>, ClientError> {
        self.get_query("/diet", query).await
    }

    pub async fn diet_summary(&self, days: Option<u32>) -> Result<DietSummaryResponse, ClientError> {
        self.get_query("/diet/summary", &PeriodQueryParams { days }).await
    }

    pub async fn delete_diet_record(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/diet/{}", urlencoding::encode(id))).await
    }

    // Goals

    pub async fn goals(&self, status: Option<GoalStatus>) -> Result<Vec<Goal>, ClientError> {
        self.get_query("/goals", &GoalListParams { status }).await
    }

    pub async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal, ClientError> {
        self.send_json(Method::POST, "/goals", request).await
    }

    pub async fn get_goal(&self, id: &str) -> Result<Goal, ClientError> {
        self.get(&format!("/goals/{}", urlencoding::encode(id))).await
    }

    pub async fn update_goal_progress(&self, id: &str, current_value: f64) -> Result<Goal, ClientError> {
        self.send_json(
            Method::PUT,
            &format!("/goals/{}/progress", urlencoding::encode(id)),
            &UpdateGoalProgressRequest { current_value },
        )
        .await
    }

    pub async fn update_goal_status(&self, id: &str, status: GoalStatus) -> Result<Goal, ClientError> {
        self.send_json(
            Method::PUT,
            &format!("/goals/{}/status", urlencoding::encode(id)),
            &UpdateGoalStatusRequest { status },
        )
        .await
    }

    pub async fn delete_goal(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/goals/{}", urlencoding::encode(id))).await
    }

    // Habits

    pub async fn habits(&self, include_archived: bool) -> Result<Vec<Habit>, ClientError> {
        self.get_query("/habits", &HabitListParams { include_archived }).await
    }

    pub async fn create_habit(&self, request: &CreateHabitRequest) -> Result<Habit, ClientError> {
        self.send_json(Method::POST, "/habits", request).await
    }

    pub async fn get_habit(&self, id: &str) -> Result<Habit, ClientError> {
        self.get(&format!("/habits/{}", urlencoding::encode(id))).await
    }

    pub async fn set_habit_archived(&self, id: &str, archived: bool) -> Result<Habit, ClientError> {
        self.send_json(
            Method::PUT,
            &format!("/habits/{}/archive", urlencoding::encode(id)),
            &ArchiveHabitRequest { archived },
        )
        .await
    }

    pub async fn delete_habit(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/habits/{}", urlencoding::encode(id))).await
    }

    pub async fn check_in(&self, habit_id: &str, request: &CheckinRequest) -> Result<HabitCheckin, ClientError> {
        self.send_json(
            Method::POST,
            &format!("/habits/{}/checkins", urlencoding::encode(habit_id)),
            request,
        )
        .await
    }

    pub async fn checkins(&self, habit_id: &str, range: &CheckinRangeParams) -> Result<Vec<HabitCheckin>, ClientError> {
        self.get_query(&format!("/habits/{}/checkins", urlencoding::encode(habit_id)), range)
            .await
    }

    pub async fn habit_stats(&self, habit_id: &str) -> Result<HabitStats, ClientError> {
        self.get(&format!("/habits/{}/stats", urlencoding::encode(habit_id))).await
    }

    // Devices

    pub async fn devices(&self) -> Result<Vec<DeviceCredential>, ClientError> {
        self.get("/devices").await
    }

    pub async fn connect_device(
        &self,
        provider: DeviceProvider,
        request: &ConnectDeviceRequest,
    ) -> Result<DeviceCredential, ClientError> {
        self.send_json(Method::PUT, &format!("/devices/{}", provider), request)
            .await
    }

    pub async fn disconnect_device(&self, provider: DeviceProvider) -> Result<(), ClientError> {
        self.delete(&format!("/devices/{}", provider)).await
    }

    pub async fn sync_device(&self, provider: DeviceProvider, request: &SyncRequest) -> Result<SyncReport, ClientError> {
        self.send_json(Method::POST, &format!("/devices/{}/sync", provider), request)
            .await
    }

    // Analysis and advice

    pub async fn analysis(&self, days: Option<u32>) -> Result<HealthAnalysis, ClientError> {
        self.get_query("/analysis", &PeriodQueryParams { days }).await
    }

    pub async fn recommendations(&self, limit: Option<usize>) -> Result<Vec<Recommendation>, ClientError> {
        self.get_query("/recommendations", &RecommendationHistoryParams { limit })
            .await
    }

    pub async fn generate_recommendation(
        &self,
        request: &GenerateRecommendationRequest,
    ) -> Result<Recommendation, ClientError> {
        self.send_json(Method::POST, "/recommendations/generate", request)
            .await
    }
}

/// Build an API error from a failed response body. A body that is not an
/// `ErrorResponse` becomes the message itself when it has any text.
fn api_error(status: StatusCode, body: &str) -> ClientError {
    if let Ok(error) = serde_json::from_str::<ErrorResponse>(body) {
        return ClientError::Api {
            status: status.as_u16(),
            code: error.error,
            message: error.message,
        };
    }

    let text = body.trim();
    let message = if !text.is_empty() {
        text.to_string()
    } else {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    };
    ClientError::Api {
        status: status.as_u16(),
        code: "unknown".to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn client(counter: Arc<AtomicUsize>) -> ApiClient {
        let redirect = move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        ApiClient::new(
            "http://localhost:3000/",
            Arc::new(InMemorySessionStore::new()),
            Arc::new(redirect),
        )
    }

    #[test]
    fn test_url_building() {
        let client = client(Arc::new(AtomicUsize::new(0)));
        assert_eq!(client.url("/goals"), "http://localhost:3000/api/v1/goals");
        assert_eq!(client.login_route, DEFAULT_LOGIN_ROUTE);

        let client = client.with_login_route("/signin");
        assert_eq!(client.login_route, "/signin");
    }

    #[test]
    fn test_api_error_prefers_plain_body() {
        match api_error(StatusCode::BAD_GATEWAY, "upstream timed out\n") {
            ClientError::Api { status, code, message } => {
                assert_eq!(status, 502);
                assert_eq!(code, "unknown");
                assert_eq!(message, "upstream timed out");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match api_error(StatusCode::BAD_GATEWAY, "") {
            ClientError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {:?}", other),
        }

        match api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":"not_found","message":"Goal with ID g1 not found"}"#,
        ) {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, "not_found");
                assert_eq!(message, "Goal with ID g1 not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_start_session_rearms_redirect() {
        let client = client(Arc::new(AtomicUsize::new(0)));
        client.redirect_armed.store(false, Ordering::SeqCst);

        let auth = AuthResponse {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: "Bearer".to_string(),
            expires_in: 900,
            user: User {
                id: "u1".to_string(),
                email: "a@example.com".to_string(),
                name: None,
                gender: None,
                birth_date: None,
                height_cm: None,
                roles: vec!["user".to_string()],
                created_at: "2024-01-01T00:00:00Z".to_string(),
                updated_at: "2024-01-01T00:00:00Z".to_string(),
            },
        };
        client.start_session(&auth);

        assert!(client.redirect_armed.load(Ordering::SeqCst));
        assert_eq!(client.session().unwrap().access_token, "access");
    }
}
