use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::shared::types::ErrorResponse;
use crate::shared::validation::field_messages;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    /// Collapse any failure into the listing "not found" response, keeping the
    /// original kind in the logs.
    pub fn reports_not_found(self) -> Self {
        match self {
            AppError::NotFound(_) => AppError::NotFound("Reports not found".to_string()),
            other => {
                tracing::error!("Report listing failed: {}", other);
                AppError::NotFound("Reports not found".to_string())
            }
        }
    }

    /// Collapse a single-report lookup failure into "Report not found".
    pub fn report_not_found(self) -> Self {
        if !matches!(self, AppError::NotFound(_)) {
            tracing::error!("Report lookup failed: {}", self);
        }
        AppError::NotFound("Report not found".to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(field_messages(&errors))
    }
}

/// Turns a store error into the message shown to the client.
pub fn db_error_message(err: &sqlx::Error) -> String {
    let Some(db_err) = err.as_database_error() else {
        return "Something went wrong".to_string();
    };

    if db_err.is_unique_violation() {
        let field = db_err
            .constraint()
            .and_then(|c| c.strip_prefix("reports_"))
            .and_then(|c| c.strip_suffix("_key"))
            .unwrap_or("Record");
        return format!("{} already exists", field);
    }

    if db_err.is_foreign_key_violation() {
        return match db_err.constraint() {
            Some(c) if c.contains("category") => "Category not found".to_string(),
            _ => "Referenced record not found".to_string(),
        };
    }

    if db_err.is_check_violation() {
        return "Invalid report data".to_string();
    }

    "Something went wrong".to_string()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::BAD_REQUEST, db_error_message(e), None)
            }
            AppError::NotFound(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Validation(ref msgs) => (
                StatusCode::BAD_REQUEST,
                msgs.first()
                    .cloned()
                    .unwrap_or_else(|| "Validation failed".to_string()),
                Some(msgs.clone()),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::PayloadTooLarge(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
        };

        (status, Json(ErrorResponse::new(message, errors))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
