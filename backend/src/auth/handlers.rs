//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data and hand it to `auth::service` for
//! the actual registration and login logic.

use crate::api::common::{FormBody, JsonBody};
use crate::auth::models::*;
use crate::auth::service::{AuthService, AuthSettings};
use crate::database::models::UserResponse;
use crate::errors::ServiceError;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(settings): Extension<Arc<AuthSettings>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ServiceError> {
    let user = AuthService::new(&pool, &settings).register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handle OAuth2-style form login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(settings): Extension<Arc<AuthSettings>>,
    FormBody(payload): FormBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ServiceError> {
    let response = AuthService::new(&pool, &settings).login(payload).await?;
    Ok(Json(response))
}

/// Handle JSON login request
#[axum::debug_handler]
pub async fn login_json(
    Extension(pool): Extension<SqlitePool>,
    Extension(settings): Extension<Arc<AuthSettings>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ServiceError> {
    let response = AuthService::new(&pool, &settings).login(payload).await?;
    Ok(Json(response))
}
