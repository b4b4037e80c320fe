//! Error types for Trendcaster
//!
//! Provides a single error enum for every component:
//! - Distinct kinds for each integration failure mode
//! - HTTP status class mapping for the boundary layer
//! - The uniform error envelope rendered to clients

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    InvalidParameter,
    UnknownCompany,

    // Resource errors (4xxx)
    NotFound,

    // Persistence errors (7xxx)
    ConstraintViolation,
    DatabaseError,
    ConnectionError,

    // External source errors (8xxx)
    SourceUnavailable,
    SourceFormat,
    GenerationFailed,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::InvalidParameter => 1001,
            ErrorCode::UnknownCompany => 1002,

            ErrorCode::NotFound => 4001,

            ErrorCode::ConstraintViolation => 7001,
            ErrorCode::DatabaseError => 7002,
            ErrorCode::ConnectionError => 7003,

            ErrorCode::SourceUnavailable => 8001,
            ErrorCode::SourceFormat => 8002,
            ErrorCode::GenerationFailed => 8003,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credential or parameter, raised while building a component.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        message: String,
        field: Option<String>,
    },

    /// Company outside the speculation allow-list.
    #[error("Unknown company: {company}")]
    UnknownCompany { company: String },

    #[error("Source unavailable: {source_name}: {message}")]
    SourceUnavailable { source_name: String, message: String },

    #[error("Unexpected response format from {source_name}: {message}")]
    SourceFormat { source_name: String, message: String },

    #[error("Not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Generation failed: {message}")]
    Generation { message: String },

    #[error("Constraint violation: {message}")]
    Constraint { message: String },

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn invalid_parameter(field: &str, message: impl Into<String>) -> Self {
        AppError::InvalidParameter {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn unavailable(source_name: &str, message: impl Into<String>) -> Self {
        AppError::SourceUnavailable {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn format(source_name: &str, message: impl Into<String>) -> Self {
        AppError::SourceFormat {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: impl ToString) -> Self {
        AppError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            AppError::UnknownCompany { .. } => ErrorCode::UnknownCompany,
            AppError::SourceUnavailable { .. } => ErrorCode::SourceUnavailable,
            AppError::SourceFormat { .. } => ErrorCode::SourceFormat,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Generation { .. } => ErrorCode::GenerationFailed,
            AppError::Constraint { .. } => ErrorCode::ConstraintViolation,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidParameter { .. } | AppError::UnknownCompany { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Configuration { .. }
            | AppError::Constraint { .. }
            | AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Serialization(_)
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::SourceFormat { .. } | AppError::Generation { .. } => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            AppError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Whether re-invoking the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::SourceUnavailable { .. })
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => AppError::Constraint { message },
            Some(SqlErr::UniqueConstraintViolation(message)) => AppError::Constraint { message },
            _ => AppError::Database(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidParameter {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidParameter {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParameter {
            message: rejection.body_text(),
            field: None,
        }
    }
}

/// Structured error envelope for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn from_error(err: &AppError) -> Self {
        let field = match err {
            AppError::InvalidParameter { field, .. } => field.clone(),
            _ => None,
        };

        Self {
            status: "error".to_string(),
            error: ErrorDetails {
                code: err.code(),
                message: err.to_string(),
                field,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from_error(&self);

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %body.error.message,
                code = ?body.error.code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %body.error.message,
                code = ?body.error.code,
                status = status.as_u16(),
                "Client error"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_kinds_are_client_errors() {
        let err = AppError::invalid_parameter("tone_level", "must be between 1 and 10");
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());

        let err = AppError::UnknownCompany { company: "Initech".into() };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::not_found("media", "17890");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_integration_kinds_are_server_errors() {
        for err in [
            AppError::unavailable("newsapi", "connection refused"),
            AppError::format("newsapi", "missing articles"),
            AppError::Generation { message: "empty".into() },
            AppError::Constraint { message: "fk".into() },
        ] {
            assert!(err.is_server_error(), "{err} should be a server error");
        }
    }

    #[test]
    fn test_only_unavailability_is_retryable() {
        assert!(AppError::unavailable("graph", "timeout").is_retryable());
        assert!(!AppError::format("graph", "bad json").is_retryable());
        assert!(!AppError::Generation { message: "empty".into() }.is_retryable());
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = AppError::invalid_parameter("company", "must not be empty");
        let body = serde_json::to_value(ErrorResponse::from_error(&err)).unwrap();

        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
        assert_eq!(body["error"]["field"], "company");
        assert!(body["error"]["message"].as_str().unwrap().contains("must not be empty"));
    }

    #[test]
    fn test_db_error_without_sql_detail_stays_database() {
        let err: AppError = DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }
}
