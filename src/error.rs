// HTTP API Error Types
use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::insights::AnalyticsError;
use crate::kpi::{DepartmentParseError, IngestError};
use crate::services::{CompanyServiceError, InsightServiceError, KpiServiceError};

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

    // 422 Unprocessable Entity (validation but semantically valid JSON)
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external service issues)
    BadGateway {
        message: String,
        upstream_status: Option<u16>,
    },

    // 503 Service Unavailable
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
            ApiError::UnprocessableEntity { .. } => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway { .. } => 502,
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
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        match self {
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            }
            | ApiError::UnprocessableEntity { field_errors, .. } => {
                response["field_errors"] = json!(field_errors);
            }
            ApiError::BadGateway {
                upstream_status: Some(status),
                ..
            } => {
                response["upstream_status"] = json!(status);
            }
            _ => {}
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
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway { .. } => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Single-field validation failure
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ApiError::validation_error(message, Some(field_errors))
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

    pub fn unprocessable_entity(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::UnprocessableEntity {
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>, upstream_status: Option<u16>) -> Self {
        ApiError::BadGateway {
            message: message.into(),
            upstream_status,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl | DatabaseError::Schema(_) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Serialization(msg) => {
                tracing::error!("Stored document could not be decoded: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidDateFormat { .. } | IngestError::Row { .. } | IngestError::Malformed(_) => {
                ApiError::bad_request(err.to_string())
            }
            IngestError::Read { .. } | IngestError::Task(_) => {
                tracing::error!("CSV ingest failed: {}", err);
                ApiError::internal_server_error("Failed to read CSV data")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSecret | AuthError::Generation(_) | AuthError::InvalidLifetime(_) => {
                tracing::error!("Token authority error: {}", err);
                ApiError::internal_server_error("Authentication is misconfigured")
            }
            AuthError::Expired | AuthError::Revoked | AuthError::Invalid(_) | AuthError::InactiveCompany => {
                ApiError::unauthorized(err.to_string())
            }
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        tracing::error!("Analytics service error: {}", err);
        match err {
            AnalyticsError::Upstream { status, .. } => {
                ApiError::bad_gateway("Analytics service returned an error", Some(status))
            }
            AnalyticsError::Request(e) => {
                ApiError::bad_gateway("Analytics service unreachable", e.status().map(|s| s.as_u16()))
            }
            AnalyticsError::Decode(_) => ApiError::bad_gateway("Analytics service returned an invalid insight", None),
            AnalyticsError::InvalidUrl(_) => ApiError::internal_server_error("Analytics service is misconfigured"),
        }
    }
}

impl From<DepartmentParseError> for ApiError {
    fn from(err: DepartmentParseError) -> Self {
        ApiError::not_found(err.to_string())
    }
}

impl From<KpiServiceError> for ApiError {
    fn from(err: KpiServiceError) -> Self {
        match err {
            KpiServiceError::NoValidRows => ApiError::bad_request(err.to_string()),
            KpiServiceError::Database(e) => e.into(),
        }
    }
}

impl From<CompanyServiceError> for ApiError {
    fn from(err: CompanyServiceError) -> Self {
        match err {
            CompanyServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            CompanyServiceError::MissingFields(ref fields) => {
                let field_errors = fields
                    .iter()
                    .map(|field| (field.to_string(), "is required".to_string()))
                    .collect();
                ApiError::validation_error(err.to_string(), Some(field_errors))
            }
            CompanyServiceError::Database(e) => e.into(),
            CompanyServiceError::Auth(e) => e.into(),
        }
    }
}

impl From<InsightServiceError> for ApiError {
    fn from(err: InsightServiceError) -> Self {
        match err {
            InsightServiceError::CompanyNotFound(_) => ApiError::not_found(err.to_string()),
            InsightServiceError::Kpi(e) => e.into(),
            InsightServiceError::Database(e) => e.into(),
            InsightServiceError::Analytics(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
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
