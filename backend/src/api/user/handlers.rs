//! Handler functions for user profile endpoints.

use crate::database::models::{User, UserResponse};
use axum::extract::{Extension, Json};

/// Get current user information
#[axum::debug_handler]
pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    tracing::debug!("Returning profile for {}", user.username);
    Json(user.into())
}
