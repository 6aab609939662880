use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type covering every pipeline stage.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Propagation policy: no stage swallows one of these and substitutes a
/// default value — every failure reaches the caller as a typed error with
/// its own code, so the front end can show a specific message and retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Portfolio index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Clone for AppError {
    // Needed to report a Failed pipeline state the session still holds.
    // `Internal` flattens its anyhow chain into a single message.
    fn clone(&self) -> Self {
        match self {
            AppError::Configuration(msg) => AppError::Configuration(msg.clone()),
            AppError::Fetch(msg) => AppError::Fetch(msg.clone()),
            AppError::Extraction(msg) => AppError::Extraction(msg.clone()),
            AppError::Parse(msg) => AppError::Parse(msg.clone()),
            AppError::IndexUnavailable(msg) => AppError::IndexUnavailable(msg.clone()),
            AppError::Generation(msg) => AppError::Generation(msg.clone()),
            AppError::Validation(msg) => AppError::Validation(msg.clone()),
            AppError::Internal(e) => AppError::Internal(anyhow::anyhow!("{e:#}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    format!("The service is misconfigured: {msg}"),
                )
            }
            AppError::Fetch(msg) => (
                StatusCode::BAD_GATEWAY,
                "FETCH_ERROR",
                format!("Could not fetch the job posting: {msg}"),
            ),
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_ERROR",
                    format!("Job extraction failed: {msg}"),
                )
            }
            AppError::Parse(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PARSE_ERROR",
                format!("The extracted job data was malformed: {msg}"),
            ),
            AppError::IndexUnavailable(msg) => {
                tracing::error!("Portfolio index unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "INDEX_UNAVAILABLE",
                    format!("The portfolio index is unavailable: {msg}"),
                )
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    format!("Email generation failed: {msg}"),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
