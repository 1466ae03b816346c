use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Storage unavailable")]
    StorageUnavailable,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code included in the error payload
    ///
    /// The UI distinguishes "fix your configuration" from "the upstream
    /// service is down" on this field rather than on message text.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "configuration-missing",
            AppError::Discovery(_) | AppError::ExternalApi(_) | AppError::HttpClient(_) => {
                "upstream-failure"
            }
            AppError::StorageUnavailable => "storage-unavailable",
            AppError::NotFound(_) => "not-found",
            AppError::InvalidInput(_) => "invalid-input",
            AppError::Database(_) | AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::StorageUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Discovery(_) | AppError::ExternalApi(_) | AppError::HttpClient(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
