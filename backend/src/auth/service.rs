//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{User, UserResponse};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use sqlx::SqlitePool;
use validator::Validate;

/// Process-wide authentication settings, built once at startup.
pub struct AuthSettings {
    pub jwt: JwtUtils,
    pub bcrypt_cost: u32,
}

impl AuthSettings {
    pub fn new(config: &Config) -> Self {
        Self {
            jwt: JwtUtils::new(config),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

#[cfg(test)]
impl AuthSettings {
    /// HS256 with a fixed secret, 30 minute tokens and the cheapest bcrypt cost.
    pub fn for_tests() -> Self {
        Self {
            jwt: JwtUtils::from_secret(
                b"test-secret",
                jsonwebtoken::Algorithm::HS256,
                chrono::Duration::minutes(30),
            ),
            bcrypt_cost: crate::config::MIN_BCRYPT_COST,
        }
    }
}

/// Authentication service for registration, login and identity resolution
pub struct AuthService<'a> {
    settings: &'a AuthSettings,
    user_service: UserService<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, settings: &'a AuthSettings) -> Self {
        let user_service = UserService::new(pool, settings.bcrypt_cost);

        AuthService {
            settings,
            user_service,
        }
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserResponse> {
        request.validate()?;

        let user = self
            .user_service
            .create_user(&request.username, &request.password, request.email.as_deref())
            .await?;

        tracing::info!("Registered user {}", user.username);
        Ok(user.into())
    }

    /// Verify credentials, check the active flag and issue a bearer token
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<TokenResponse> {
        let user = self
            .user_service
            .authenticate_user(&login_request.username, &login_request.password)
            .await
            .inspect_err(|_| tracing::warn!("Failed login for {}", login_request.username))?;

        if !user.is_active {
            tracing::warn!("Login refused for inactive user {}", user.username);
            return Err(ServiceError::InactiveAccount);
        }

        let access_token = self.settings.jwt.generate_token(&user.username)?;

        tracing::info!("Issued access token for {}", user.username);
        Ok(TokenResponse::bearer(
            access_token,
            self.settings.jwt.expires_in_seconds(),
        ))
    }

    /// Resolve the user a bearer token belongs to
    pub async fn resolve_identity(&self, token: &str) -> ServiceResult<User> {
        let claims = self.settings.jwt.validate_token(token)?;

        let user = self
            .user_service
            .find_by_username(claims.username())
            .await?
            .ok_or_else(|| ServiceError::unauthorized("Could not validate credentials"))?;

        if !user.is_active {
            return Err(ServiceError::InactiveAccount);
        }

        Ok(user)
    }
}
