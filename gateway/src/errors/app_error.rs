use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::core::dialin::TelephonyError;
use crate::core::tts::{TTSError, TTSErrorKind};

/// Errors surfaced by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<TTSError> for AppError {
    fn from(error: TTSError) -> Self {
        match error.kind() {
            TTSErrorKind::SynthesisService => AppError::BadGateway(error.to_string()),
            TTSErrorKind::AudioDecode => AppError::Unprocessable(error.to_string()),
            TTSErrorKind::Configuration => AppError::ServiceUnavailable(error.to_string()),
        }
    }
}

impl From<TelephonyError> for AppError {
    fn from(error: TelephonyError) -> Self {
        match error {
            TelephonyError::SessionClosed(_) => AppError::NotFound(error.to_string()),
            TelephonyError::InvalidConfiguration(_) => {
                AppError::ServiceUnavailable(error.to_string())
            }
            _ => AppError::Internal(error.to_string()),
        }
    }
}
