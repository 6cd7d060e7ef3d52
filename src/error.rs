// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::mail::MailError;
use crate::models::ValidationError;
use crate::scheduling::SlotError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (mail relay)
    BadGateway(String),

    // 503 Service Unavailable (store timeout)
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            if !field_errors.is_empty() {
                response["field_errors"] = json!(field_errors);
            }
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken
            | AuthError::MalformedToken(_)
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::InvalidCredentials => {
                tracing::warn!("Authentication rejected: {}", err);
                ApiError::unauthorized(err.to_string())
            }
            AuthError::WrongRole { .. } => {
                tracing::warn!("Authorization rejected: {}", err);
                ApiError::forbidden(err.to_string())
            }
            AuthError::MissingSecret(_) | AuthError::TokenGeneration(_) | AuthError::Hashing(_) => {
                tracing::error!("Auth subsystem failure: {}", err);
                ApiError::internal_server_error("Authentication is temporarily unavailable")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            StoreError::DuplicateId(_) => ApiError::conflict(err.to_string()),
            StoreError::Timeout { .. } => {
                tracing::error!("Store timeout: {}", err);
                ApiError::service_unavailable("Database operation timed out")
            }
            StoreError::PartialBatch { .. } => {
                // Callers are told how far the batch got; inserted documents stay.
                tracing::error!("Partial batch insert: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
            StoreError::Connection(_) => {
                tracing::error!("Store connection error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::InvalidCollection(_)
            | StoreError::MissingId
            | StoreError::Serialization(_)
            | StoreError::Sqlx(_) => {
                // Log the real error but return generic message
                tracing::error!("Store error: {}", err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<SlotError> for ApiError {
    fn from(err: SlotError) -> Self {
        let field = match &err {
            SlotError::NonPositivePeriod(_) | SlotError::PeriodTooLong(_) => "period",
            SlotError::UnknownWeekday(_) => "weekdays",
            SlotError::InvalidTime { field, .. } => *field,
            SlotError::ShiftEndsBeforeStart { .. } => "shift_end",
            SlotError::HorizonOutOfRange => return ApiError::bad_request(err.to_string()),
        };
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), err.to_string());
        ApiError::validation_error("Invalid availability template", Some(field_errors))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field_errors = (!err.field_errors.is_empty()).then_some(err.field_errors);
        ApiError::validation_error(err.message, field_errors)
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail dispatch failed: {}", err);
        match err {
            MailError::NotConfigured(_) => ApiError::internal_server_error("Mail delivery is not configured"),
            MailError::Transport(_) | MailError::Rejected(_) => {
                ApiError::bad_gateway("Failed to send verification email")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
