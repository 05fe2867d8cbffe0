//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Startup configuration errors (environment variables).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(String),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Zero rows matched an id-scoped lookup or mutation.
    #[error("{0} not found")]
    NotFound(String),
    /// More than one row matched an id-scoped mutation, or a result row could not be attributed.
    #[error("data integrity: {0}")]
    DataIntegrity(String),
    /// Composer/hydrator misuse: bad chain, unknown filter column, shape mismatch.
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::DataIntegrity(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        } else if status == StatusCode::NOT_FOUND {
            tracing::warn!(error = %self, "not found");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_taxonomy_to_status() {
        assert_eq!(
            AppError::NotFound("product".into()).status_and_code(),
            (StatusCode::NOT_FOUND, "not_found")
        );
        assert_eq!(
            AppError::DataIntegrity("2 rows".into()).status_and_code().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Configuration("empty chain".into()).status_and_code().1,
            "configuration_error"
        );
        assert_eq!(
            AppError::Db(sqlx::Error::RowNotFound).status_and_code().0,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(AppError::NotFound("product".into()).to_string(), "product not found");
    }
}
