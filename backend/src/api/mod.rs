//! Central module for organizing the application's HTTP surface.
//!
//! Builds the full router: operational routes at the root, the versioned API
//! (authentication and user profile) under the configured prefix, and the
//! shared layers (tracing, CORS, per-request dependencies).

pub mod common;
pub mod user;

use crate::api::common::ApiResponse;
use crate::auth::{self, service::AuthSettings};
use crate::config::Config;
use crate::errors::ServiceError;
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Json,
    routing::get,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Name and version reported by the root endpoint
#[derive(Clone)]
struct ServiceInfo {
    name: String,
    version: String,
}

/// Builds the application router around an open connection pool.
pub fn app_router(config: &Config, pool: SqlitePool) -> Result<Router> {
    let settings = Arc::new(AuthSettings::new(config));
    let info = ServiceInfo {
        name: config.app_name.clone(),
        version: config.app_version.clone(),
    };

    let api = Router::new()
        .nest("/auth", auth::routes::auth_router())
        .nest("/users", user::routes::user_router());

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler));

    let router = if config.api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&config.api_prefix, api)
    };

    Ok(router
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(settings))
        .layer(Extension(info))
        .layer(Extension(pool)))
}

/// Allowed origins come from configuration; `*` opens the API to any origin
/// but then credentials are not allowed.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(cors
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

async fn root_handler(Extension(info): Extension<ServiceInfo>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(
        json!({
            "service": info.name,
            "version": info.version,
        }),
        format!("Welcome to {}", info.name),
    ))
}

async fn health_handler(
    Extension(pool): Extension<SqlitePool>,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Health check query failed")?;

    Ok(Json(ApiResponse::success(
        json!({ "database": "ok" }),
        "Service healthy",
    )))
}
