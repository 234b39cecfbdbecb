use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

pub type HrResult<T> = Result<T, HrError>;

/// Every failure a store or handler can report.
#[derive(Debug, Error)]
pub enum HrError {
    /// Field-level problem with caller input
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Leave request is no longer pending
    #[error("leave request '{id}' is already {current}, cannot mark it {requested}")]
    InvalidTransition {
        id: String,
        current: LeaveStatus,
        requested: LeaveStatus,
    },

    /// Backing store (database) failed or is unreachable
    #[error("external service failure: {0}")]
    ExternalService(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),
}

impl HrError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        HrError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        HrError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for HrError {
    fn from(e: sqlx::Error) -> Self {
        HrError::ExternalService(e.to_string())
    }
}

impl ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::Validation { .. } => StatusCode::BAD_REQUEST,
            HrError::NotFound { .. } => StatusCode::NOT_FOUND,
            HrError::InvalidTransition { .. } => StatusCode::CONFLICT,
            HrError::ExternalService(_) => StatusCode::SERVICE_UNAVAILABLE,
            HrError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HrError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            HrError::Validation { field, message } => json!({
                "message": message,
                "field": field,
            }),
            HrError::ExternalService(detail) => {
                tracing::error!(error = %detail, "External service failure");
                json!({
                    "message": "Service temporarily unavailable, please retry",
                    "retryable": true,
                })
            }
            other => json!({ "message": other.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
