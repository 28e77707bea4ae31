use reqwest::StatusCode;
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The tree changed on the server since it was fetched
    #[error("Stale tree version: {0}")]
    StaleVersion(String),

    /// Drag combination the tree editor does not support
    #[error("Unsupported move: {0}")]
    UnsupportedMove(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// Map a non-success admin API response to an error.
    ///
    /// The body is parsed as the standard `ApiResponse` envelope when possible so
    /// that server-side validation messages reach the caller.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| {
                envelope
                    .errors
                    .filter(|errors| !errors.is_empty())
                    .map(|errors| errors.join("; "))
                    .or(envelope.message)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::Validation(message)
            }
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            StatusCode::PRECONDITION_FAILED => AppError::StaleVersion(message),
            _ => AppError::ExternalServiceError(format!("Admin API error: {}", message)),
        }
    }

    /// Short text suitable for a toast notification
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Please check the form: {}", msg),
            AppError::NotFound(_) => "The item no longer exists".to_string(),
            AppError::Unauthorized(_) | AppError::Forbidden(_) => {
                "You are not allowed to change categories".to_string()
            }
            AppError::Conflict(_) | AppError::StaleVersion(_) => {
                "Categories were changed by someone else, please reload".to_string()
            }
            AppError::UnsupportedMove(msg) => msg.clone(),
            _ => "Something went wrong, please try again".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
