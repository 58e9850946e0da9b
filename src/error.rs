//! Error types shared by services and HTTP handlers.

use std::borrow::Cow;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation failed")]
    ValidationFailed(#[from] ValidationErrors),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Single-field validation failure for checks the derive macros cannot express.
    pub fn invalid_field(field: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new("invalid").with_message(message.into()));
        Self::ValidationFailed(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Duplicate username/email/like is reported as a bad request.
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::ValidationFailed(errors) => json!({
                "success": false,
                "message": "Validation failed",
                "errors": field_messages(errors),
            }),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                json!({ "success": false, "message": "An unexpected error occurred" })
            }
            other => json!({ "success": false, "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Malformed or mistyped JSON bodies are reported like any other validation failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected json body");
        let mut errors = ValidationErrors::new();
        errors.add(
            "body",
            ValidationError::new("invalid_json").with_message(Cow::Owned(rejection.body_text())),
        );
        Self::ValidationFailed(errors)
    }
}

fn field_messages(errors: &ValidationErrors) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let msgs: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), json!(msgs))
        })
        .collect();
    serde_json::Value::Object(map)
}

/// Errors reported by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Holds the offending field.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// A referenced row is gone. Holds what was referenced.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                let field = match db.constraint() {
                    Some(c) if c.contains("username") => "username",
                    Some(c) if c.contains("email") => "email",
                    Some(c) if c.contains("like") => "like",
                    _ => "record",
                };
                return StoreError::Duplicate(field);
            }
            if db.is_foreign_key_violation() {
                let target = match db.constraint() {
                    Some(c) if c.contains("post_id") => "post",
                    Some(c) if c.contains("user_id") || c.contains("author") => "user",
                    _ => "record",
                };
                return StoreError::NotFound(target);
            }
        }
        StoreError::Other(anyhow::Error::new(e))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => AppError::Conflict(format!("{field} already exists")),
            StoreError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}
