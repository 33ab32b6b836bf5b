//! HTTP API over the job service
//!
//! Routes, all under `/api/v1`:
//! - `POST /links` creates a job from a newline-separated URL list
//! - `GET /links/status/:job_id` returns the job's results once they exist
//! - `GET /links/jobs/:job_id` returns the job and its lifecycle state

mod handlers;
mod response;

pub use response::{ApiResponse, JobCreated, JobResults, INTERNAL_SERVER_ERROR};

use crate::jobs::LinkJobService;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;

/// Builds the API router
pub fn router(service: LinkJobService) -> Router {
    let v1 = Router::new()
        .route("/links", post(handlers::create_job))
        .route("/links/status/:job_id", get(handlers::job_status))
        .route("/links/jobs/:job_id", get(handlers::get_job))
        .with_state(service);

    Router::new().nest("/api/v1", v1)
}

/// Serves the API on `listener` until `shutdown` resolves
///
/// In-progress requests are allowed to finish before this returns. Jobs
/// running in the background are not waited for here.
pub async fn serve<F>(
    listener: TcpListener,
    service: LinkJobService,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("API listening on {}", addr);
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
