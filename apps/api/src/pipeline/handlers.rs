//! Axum route handlers for the outreach pipeline.
//!
//! The handlers are the thin front-end collaborator surface over the one
//! pipeline session: extract first, then generate. Each stage failure
//! surfaces as a typed `AppError` so the caller can display a specific
//! message and retry with a fresh submission.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::JobRecord;
use crate::pipeline::PipelineState;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub job: JobRecord,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub email: String,
}

/// POST /api/v1/jobs/extract
///
/// Submits the job posting URL to the session pipeline and returns the
/// structured job record. Discards any prior job or email state.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let mut pipeline = state.pipeline.lock().await;
    match pipeline.submit(&request.url).await {
        PipelineState::Extracted(job) => Ok(Json(ExtractResponse { job: job.clone() })),
        PipelineState::Failed(e) => Err(e.clone()),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "submit left the pipeline in an unexpected state: {other:?}"
        ))),
    }
}

/// POST /api/v1/emails/generate
///
/// Runs retrieval and composition for the session's extracted job record
/// and returns the generated email.
pub async fn handle_generate(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let mut pipeline = state.pipeline.lock().await;
    match pipeline.generate().await {
        PipelineState::Composed { email, .. } => Ok(Json(GenerateResponse {
            email: email.clone(),
        })),
        PipelineState::Failed(e) => Err(e.clone()),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "generate left the pipeline in an unexpected state: {other:?}"
        ))),
    }
}
