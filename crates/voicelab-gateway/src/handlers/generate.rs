//! `/api/demo/generate`: submit a job (POST), poll it (GET), cancel it (DELETE).

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use voicelab_core::audio::{format_duration, format_file_size};
use voicelab_core::{DemoError, DemoService, GenerationRequest, GenerationResult, Job, Phase};

use super::AppState;
use crate::response::{rate_limit_headers, ApiError, ApiResponse, NO_STORE};

#[derive(Debug, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub job_id: Option<String>,
}

/// What pollers see of a job. Completed jobs also carry display strings for the player.
#[derive(Debug, Serialize)]
pub struct JobStatusView {
    pub job_id: String,
    pub status: Phase,
    pub progress: u8,
    pub message: String,
    pub estimated_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_display: Option<String>,
}

impl From<Job> for JobStatusView {
    fn from(job: Job) -> Self {
        let duration_display = job.result.as_ref().map(|r| format_duration(r.duration));
        let file_size_display = job
            .result
            .as_ref()
            .map(|r| format_file_size(r.file_size.saturating_mul(1024)));
        Self {
            job_id: job.id,
            status: job.phase,
            progress: job.progress,
            message: job.message,
            estimated_time: job.estimated_time,
            result: job.result,
            duration_display,
            file_size_display,
        }
    }
}

/// POST: rate-limit headers are attached whether or not the job was accepted.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let outcome = match payload {
        Ok(Json(request)) => state.service.submit(request),
        Err(rejection) => Err(DemoError::Validation(rejection.body_text())),
    };
    let headers = rate_limit_headers(&state.service.rate_limit());
    match outcome {
        Ok(receipt) => (headers, Json(ApiResponse::ok(receipt))).into_response(),
        Err(err) => {
            if err.is_client_error() {
                tracing::info!(error = %err, "generation request rejected");
            }
            (headers, ApiError(err)).into_response()
        }
    }
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let job_id = DemoService::check_job_id(query.job_id.as_deref())?;
    let job = state.service.status(job_id)?;
    Ok((
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ApiResponse::ok(JobStatusView::from(job))),
    ))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let job_id = DemoService::check_job_id(query.job_id.as_deref())?;
    let job = state.service.cancel(job_id)?;
    Ok((
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ApiResponse::ok(JobStatusView::from(job))),
    ))
}
