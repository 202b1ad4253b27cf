use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use health_track_data::models::user::{NewUser, UserProfileUpdate};
use health_track_data::repository::UserRepositoryTrait;

use crate::auth::logging::{
    log_failed_login, log_logout, log_registration, log_successful_login, log_token_refresh,
    log_token_revocation,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Claims, TokenService, TokenType};
use crate::entities::common::parse_date;
use crate::entities::conversions;
use crate::entities::user::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest, User,
};
use crate::error::{validate_request, ServiceError};

/// Role granted to every self-registered account
pub const DEFAULT_ROLE: &str = "user";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Create an account and sign it in
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError>;

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError>;

    /// Trade a refresh token for a new access token
    async fn refresh(&self, request: RefreshRequest) -> Result<AuthResponse, ServiceError>;

    /// Revoke the presented access token
    async fn logout(&self, claims: &Claims) -> Result<(), ServiceError>;

    async fn get_profile(&self, user_id: &str) -> Result<User, ServiceError>;

    async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> Result<User, ServiceError>;
}

pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
    tokens: Arc<TokenService>,
}

impl<R: UserRepositoryTrait> UserService<R> {
    pub fn new(repository: R, tokens: Arc<TokenService>) -> Self {
        Self { repository, tokens }
    }

    fn signed_in(&self, user: User) -> Result<AuthResponse, ServiceError> {
        let pair = self.tokens.issue_pair(&user.id, &user.roles)?;
        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: Some(pair.refresh_token),
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
            user,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_not_found(user_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("User with ID {} not found", user_id))
}

#[async_trait]
impl<R: UserRepositoryTrait + Send + Sync> UserServiceTrait for UserService<R> {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        validate_request(&request)?;

        let email = normalize_email(&request.email);
        let password_hash = hash_password(&request.password)?;
        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let record = self
            .repository
            .create(NewUser {
                email,
                password_hash,
                name,
                roles: DEFAULT_ROLE.to_string(),
            })
            .await?;

        info!("Registered user {}", record.id);
        log_registration(&record.id);
        self.signed_in(conversions::convert_to_domain_user(record))
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        validate_request(&request)?;

        let email = normalize_email(&request.email);
        let record = match self.repository.get_by_email(&email).await? {
            Some(record) => record,
            None => {
                log_failed_login(&email, "unknown email");
                return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&request.password, &record.password_hash) {
            log_failed_login(&email, "password mismatch");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        log_successful_login(&record.id);
        self.signed_in(conversions::convert_to_domain_user(record))
    }

    async fn refresh(&self, request: RefreshRequest) -> Result<AuthResponse, ServiceError> {
        let claims = match self.tokens.validate_refresh_token(&request.refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                log_token_refresh(None, false, Some(&e.to_string()));
                return Err(e.into());
            }
        };

        // The account may have been removed since the refresh token was issued
        let record = match self.repository.get_by_id(&claims.sub).await? {
            Some(record) => record,
            None => {
                warn!("Refresh token presented for unknown user {}", claims.sub);
                log_token_refresh(Some(&claims.sub), false, Some("unknown user"));
                return Err(ServiceError::Unauthorized("User no longer exists".to_string()));
            }
        };
        let user = conversions::convert_to_domain_user(record);

        let access_token = self
            .tokens
            .generate_token(&user.id, TokenType::Access, &user.roles)?;
        log_token_refresh(Some(&user.id), true, None);

        Ok(AuthResponse {
            access_token,
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_ttl_seconds(),
            user,
        })
    }

    async fn logout(&self, claims: &Claims) -> Result<(), ServiceError> {
        self.tokens.revoke(claims)?;
        log_token_revocation(&claims.sub, &claims.jti);
        log_logout(&claims.sub);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<User, ServiceError> {
        self.repository
            .get_by_id(user_id)
            .await?
            .map(conversions::convert_to_domain_user)
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> Result<User, ServiceError> {
        validate_request(&request)?;

        let birth_date = match request.birth_date.as_deref() {
            Some(raw) => {
                let date = parse_date(raw)?;
                if date > chrono::Utc::now().date_naive() {
                    return Err(ServiceError::Validation(
                        "birth_date: Birth date cannot be in the future".to_string(),
                    ));
                }
                Some(date.format("%Y-%m-%d").to_string())
            }
            None => None,
        };

        let update = UserProfileUpdate {
            name: request.name.map(|n| n.trim().to_string()),
            gender: request.gender.map(|g| g.as_str().to_string()),
            birth_date,
            height_cm: request.height_cm,
        };

        self.repository
            .update_profile(user_id, update)
            .await?
            .map(conversions::convert_to_domain_user)
            .ok_or_else(|| user_not_found(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SecurityError, TokenConfig};
    use crate::entities::user::Gender;
    use health_track_data::database::DatabasePool;
    use health_track_data::repository::SqliteUserRepository;

    fn service() -> (UserService<SqliteUserRepository>, Arc<TokenService>) {
        let pool = DatabasePool::in_memory().unwrap();
        let tokens = Arc::new(TokenService::new(TokenConfig::new("users-test-secret")));
        (UserService::new(SqliteUserRepository::new(pool), tokens.clone()), tokens)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct-horse".to_string(),
            name: Some("Amy".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, tokens) = service();
        let registered = service.register(register_request("Amy@Example.com")).await.unwrap();
        assert_eq!(registered.user.email, "amy@example.com");
        assert_eq!(registered.user.roles, vec!["user".to_string()]);
        assert_eq!(registered.token_type, "Bearer");
        assert!(registered.refresh_token.is_some());

        let claims = tokens.validate_access_token(&registered.access_token).unwrap();
        assert_eq!(claims.sub, registered.user.id);

        let logged_in = service
            .login(LoginRequest {
                email: "amy@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (service, _) = service();
        service.register(register_request("amy@example.com")).await.unwrap();

        let err = service.register(register_request("AMY@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let (service, _) = service();
        service.register(register_request("amy@example.com")).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: "amy@example.com".to_string(),
                password: "wrong-horse".to_string(),
            })
            .await
            .unwrap_err();
        let unknown = service
            .login(LoginRequest {
                email: "bob@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap_err();

        // Same message either way so accounts cannot be probed
        assert_eq!(wrong_password.to_string(), unknown.to_string());
        assert!(matches!(wrong_password, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let (service, tokens) = service();
        let registered = service.register(register_request("amy@example.com")).await.unwrap();

        let err = service
            .refresh(RefreshRequest {
                refresh_token: registered.access_token.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let refreshed = service
            .refresh(RefreshRequest {
                refresh_token: registered.refresh_token.clone().unwrap(),
            })
            .await
            .unwrap();
        assert!(refreshed.refresh_token.is_none());
        let claims = tokens.validate_token(&refreshed.access_token).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[tokio::test]
    async fn test_logout_revokes_only_presented_token() {
        let (service, tokens) = service();
        let registered = service.register(register_request("amy@example.com")).await.unwrap();
        let claims = tokens.validate_access_token(&registered.access_token).unwrap();

        service.logout(&claims).await.unwrap();

        assert!(matches!(
            tokens.validate_access_token(&registered.access_token),
            Err(SecurityError::TokenRevoked)
        ));
        assert!(tokens
            .validate_refresh_token(registered.refresh_token.as_deref().unwrap())
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (service, _) = service();
        let user = service.register(register_request("amy@example.com")).await.unwrap().user;

        let updated = service
            .update_profile(
                &user.id,
                UpdateProfileRequest {
                    gender: Some(Gender::Female),
                    birth_date: Some("1990-05-17".to_string()),
                    height_cm: Some(165.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Amy"));
        assert_eq!(updated.gender, Some(Gender::Female));
        assert_eq!(updated.birth_date.as_deref(), Some("1990-05-17"));

        let err = service
            .update_profile(
                &user.id,
                UpdateProfileRequest {
                    birth_date: Some("17/05/1990".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(matches!(
            service.get_profile("missing").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
