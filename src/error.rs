use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::{auth::AuthError, validate::ValidationError};

/// Errors as the client sees them. Each variant fixes a status code and body shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{message}")]
    NoData {
        status: StatusCode,
        message: &'static str,
    },
    #[error("{message}")]
    Internal {
        message: &'static str,
        details: Option<String>,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
}

impl ApiError {
    /// Generic 500 whose underlying cause is only attached when `expose` is set.
    pub fn internal(message: &'static str, cause: &dyn std::error::Error, expose: bool) -> Self {
        log::error!("{message} {cause}");
        Self::Internal {
            message,
            details: expose.then(|| cause.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Auth(AuthError::Signing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NoData { status, .. } => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Auth(AuthError::IncorrectPassword) => {
                json!({ "ok": false, "error": self.to_string() })
            }
            ApiError::Auth(AuthError::Signing(_)) => {
                json!({ "ok": false, "error": "Internal server error" })
            }
            ApiError::Auth(err) => json!({ "error": err.to_string() }),
            ApiError::NoData { message, .. } => json!({ "success": false, "message": message }),
            ApiError::Internal { message, details } => match details {
                Some(details) => json!({ "success": false, "error": message, "details": details }),
                None => json!({ "success": false, "error": message }),
            },
            other => json!({ "success": false, "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
