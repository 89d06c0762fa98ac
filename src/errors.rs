use crate::db::errors::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided or invalid
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated but not allowed. No route produces this today: the
    /// policy only distinguishes authenticated-vs-not.
    #[error("Insufficient permissions to {action} {resource}")]
    InsufficientPermissions { action: String, resource: String },

    /// Invalid request data, reported per field
    #[error("Validation failed")]
    Validation { errors: ValidationErrors },

    /// Invalid request data or business rule violation without a field to
    /// attach it to
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Field-level validation messages, serialized as `{"field": ["msg", ...]}`
#[derive(Debug, Default, Serialize)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ok(()) when no messages were recorded, otherwise the 400 error
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { errors: self })
        }
    }
}

impl Error {
    /// Single-field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Error::Validation { errors }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                // Duplicate input is a validation failure on this API, not a 409
                DbError::UniqueViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication credentials were not provided.".to_string()),
            Error::InsufficientPermissions { action, resource } => {
                format!("Insufficient permissions to {action} {resource}")
            }
            Error::Validation { .. } => "Validation failed".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { .. } => "Resource already exists".to_string(),
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match &self {
            // Field-level body, mirroring {"field": ["message", ...]}
            Error::Validation { errors } => (status, axum::response::Json(serde_json::json!(errors))).into_response(),
            // Unique violations on known columns become field-level messages too
            Error::Database(DbError::UniqueViolation { table, column, .. }) => {
                use serde_json::json;

                let body = match (table.as_deref(), column.as_deref()) {
                    (Some("maintainers"), Some("email")) => {
                        json!({ "email": ["maintainer with this email already exists."] })
                    }
                    _ => json!({ "detail": "Resource already exists" }),
                };

                (status, axum::response::Json(body)).into_response()
            }
            _ => {
                let body = serde_json::json!({ "detail": self.user_message() });
                (status, axum::response::Json(body)).into_response()
            }
        }
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
