use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::backend::BackendError;
use crate::fetch::FetchError;
use crate::models::BookingStatus;
use crate::preferences::PreferencesError;
use crate::utils::response::error as error_response;
use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {}", .0.summary())]
    ValidationError(FieldErrors),

    /// The backend's save hook refused the write; its message is user-facing.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Backend error")]
    BackendError(BackendError),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::BackendError(_) => StatusCode::BAD_GATEWAY,
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Rejected(_) => "REJECTED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::BackendError(_) => "BACKEND_ERROR",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Read failures keep their attempt tag in the public message.
    pub fn from_fetch(err: FetchError) -> Self {
        match err.error {
            BackendError::NotFound { .. } | BackendError::Rejected(_) => Self::from(err.error),
            _ => {
                error!(error = %err, attempts = err.attempts, "Backend read failed");
                AppError::ExternalServiceError(err.to_string())
            }
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(fields) => {
                error!(error = ?self, fields = ?fields, "Validation error");
            }
            AppError::Rejected(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::InvalidTransition { from, to } => {
                error!(%from, %to, "Invalid booking transition");
            }
            AppError::BackendError(e) => {
                error!(error = ?e, "Backend error");
            }
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound { doctype, id } => {
                AppError::NotFound(format!("{doctype} '{id}' was not found"))
            }
            BackendError::Rejected(message) => AppError::Rejected(message),
            other => AppError::BackendError(other),
        }
    }
}

impl From<PreferencesError> for AppError {
    fn from(err: PreferencesError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let (public_message, details) = match &self {
            AppError::ValidationError(fields) => (fields.summary(), Some(json!(fields))),
            AppError::Rejected(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalServiceError(msg) => (msg.clone(), None),
            AppError::InvalidTransition { .. } => (self.to_string(), None),
            AppError::BackendError(_) => ("The event backend is unavailable".to_string(), None),
            AppError::InternalServerError(_) => ("An internal error occurred".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}
