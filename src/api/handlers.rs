//! Request handlers for the link census routes

use crate::api::response::{error_response, internal_error, ApiResponse, JobCreated, JobResults};
use crate::jobs::{EnqueueJobRequest, LinkJobService};
use crate::store::StoreError;
use crate::urls::parse_url_list;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

/// `POST /api/v1/links`
///
/// Takes a plain-text body with one URL per line and answers as soon as the
/// job is stored. Execution continues in the background.
pub async fn create_job(State(service): State<LinkJobService>, body: String) -> Response {
    let urls = match parse_url_list(&body) {
        Ok(urls) => urls,
        Err(e) => {
            tracing::debug!("Rejected job request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if urls.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "empty job request");
    }

    match service.enqueue_job(EnqueueJobRequest::new(urls)) {
        Ok(job) => {
            ApiResponse::data(JobCreated { job_id: job.id }).with_status(StatusCode::ACCEPTED)
        }
        Err(StoreError::AlreadyExists(_)) => {
            error_response(StatusCode::CONFLICT, "job already exists")
        }
        Err(e) => internal_error(&e),
    }
}

/// `GET /api/v1/links/status/:job_id`
///
/// 202 with an empty envelope means the job exists but is not done yet.
pub async fn job_status(
    State(service): State<LinkJobService>,
    Path(job_id): Path<String>,
) -> Response {
    match service.get_job_status(&job_id) {
        Ok(results) => ApiResponse::data(JobResults { results }).with_status(StatusCode::OK),
        Err(StoreError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, "job not found"),
        Err(StoreError::ResultsNotFound(_)) => {
            ApiResponse::<()>::empty().with_status(StatusCode::ACCEPTED)
        }
        Err(e) => internal_error(&e),
    }
}

/// `GET /api/v1/links/jobs/:job_id`
pub async fn get_job(
    State(service): State<LinkJobService>,
    Path(job_id): Path<String>,
) -> Response {
    match service.get_job(&job_id) {
        Ok(job) => ApiResponse::data(job).with_status(StatusCode::OK),
        Err(StoreError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, "job not found"),
        Err(e) => internal_error(&e),
    }
}
