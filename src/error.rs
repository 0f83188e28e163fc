//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} id '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: table {table_id} column {column}")]
    InvalidPrimaryKey { table_id: String, column: String },
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("model load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("invalid setting {key}: '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    ConstraintViolation(String),
    /// Connection, query or unreadable request body; the message is passed through to the client.
    #[error("{0}")]
    Storage(String),
}

/// Unique, not-null, foreign-key and check breaches become `ConstraintViolation`; everything else is a storage error.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation => {
                    return AppError::ConstraintViolation(db.message().to_string());
                }
                _ => {}
            }
        }
        AppError::Storage(e.to_string())
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::ConstraintViolation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "constraint_violation"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_has_fixed_message() {
        let resp = AppError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "resource not found");
    }

    #[tokio::test]
    async fn constraint_violation_is_500_with_raw_message() {
        let msg = "duplicate key value violates unique constraint \"accounts_username_key\"";
        let resp = AppError::ConstraintViolation(msg.into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "constraint_violation");
        assert_eq!(body["error"]["message"], msg);
    }

    #[test]
    fn non_database_sqlx_errors_are_storage_errors() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.status_and_code(), (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn unreadable_body_is_a_storage_error() {
        let err = AppError::Storage("body must be a JSON object".into());
        assert_eq!(err.status_and_code(), (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"));
    }
}
