//! Error handling utilities for API responses.
//!
//! Provides structured error responses and conversion between service-layer errors
//! and HTTP responses.
//!
//! # Response Format
//! All errors return consistent JSON responses containing:
//! - `message`: Human-readable message
//! - `error.error_type`: Machine-readable error category
//! - `error.details`: Optional field-specific validation errors
//!
//! # Error Handling Flow
//! 1. Service layer returns domain-specific `ServiceError`
//! 2. `service_error_to_http` picks the status code, error type and message
//! 3. `IntoResponse` wraps it in an `ApiResponse` envelope
//!
//! Request bodies go through `JsonBody` and `FormBody` so that a body that
//! fails to parse is reported the same way as any other validation error.

use crate::errors::ServiceError;
use axum::{
    Json,
    extract::{
        FromRequest,
        rejection::{FormRejection, JsonRejection},
    },
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Request timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-specific validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(
        message: impl Into<String>,
        error_type: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// JSON body extractor whose rejection is a `ServiceError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct JsonBody<T>(pub T);

/// URL-encoded form body extractor whose rejection is a `ServiceError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ServiceError))]
pub struct FormBody<T>(pub T);

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation {
            message: rejection.body_text(),
            fields: Vec::new(),
        }
    }
}

impl From<FormRejection> for ServiceError {
    fn from(rejection: FormRejection) -> Self {
        ServiceError::Validation {
            message: rejection.body_text(),
            fields: Vec::new(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP status and standard error body
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, ApiResponse<()>) {
    let (status, error_type, message, details) = match error {
        ServiceError::Validation { message, fields } => {
            let details = (!fields.is_empty()).then(|| {
                fields
                    .into_iter()
                    .map(|(field, message)| FieldError { field, message })
                    .collect()
            });
            (StatusCode::BAD_REQUEST, "validation_error", message, details)
        }
        ServiceError::AlreadyExists { entity, .. } => (
            StatusCode::BAD_REQUEST,
            "already_exists",
            format!("{} already registered", entity),
            None,
        ),
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Incorrect username or password".to_string(),
            None,
        ),
        ServiceError::InactiveAccount => (
            StatusCode::BAD_REQUEST,
            "inactive_account",
            "Inactive user".to_string(),
            None,
        ),
        ServiceError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message, None)
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {:#}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Internal server error".to_string(),
                None,
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
                None,
            )
        }
    };

    (status, ApiResponse::<()>::error(message, error_type, details))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = service_error_to_http(self);

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::Validation {
                    message: "bad".to_string(),
                    fields: Vec::new(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::already_exists("Username", "alice"),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::InactiveAccount, StatusCode::BAD_REQUEST),
            (ServiceError::unauthorized("nope"), StatusCode::UNAUTHORIZED),
            (
                ServiceError::from(anyhow::anyhow!("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(service_error_to_http(error).0, expected);
        }
    }

    #[test]
    fn test_internal_details_not_leaked() {
        let (_, body) = service_error_to_http(ServiceError::from(anyhow::anyhow!("disk on fire")));
        assert_eq!(body.message, "Internal server error");
        assert_eq!(body.error.unwrap().error_type, "database_error");
    }

    #[test]
    fn test_validation_fields_become_details() {
        let error = ServiceError::Validation {
            message: "username: too short".to_string(),
            fields: vec![("username".to_string(), "too short".to_string())],
        };
        let (status, body) = service_error_to_http(error);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let details = body.error.unwrap().details.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "username");
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = ServiceError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");

        let response = ServiceError::InactiveAccount.into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }
}
