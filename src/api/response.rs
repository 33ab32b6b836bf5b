use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message returned for errors whose detail stays in the server log
pub const INTERNAL_SERVER_ERROR: &str = "internal.server.error";

/// JSON envelope shared by every endpoint
///
/// Both fields are omitted when empty, so a bare acknowledgement
/// serializes as `{}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            errors: None,
            data: Some(data),
        }
    }

    pub fn empty() -> Self {
        Self {
            errors: None,
            data: None,
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Builds an error response with a single message
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    ApiResponse::<()> {
        errors: Some(vec![message.into()]),
        data: None,
    }
    .with_status(status)
}

/// Builds a 500 response, keeping the detail out of the body
pub fn internal_error(detail: &dyn std::fmt::Display) -> Response {
    tracing::error!("Request failed: {}", detail);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

/// Body of a successful job creation
#[derive(Debug, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: String,
}

/// Body of a job status read
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResults<T> {
    pub results: Vec<T>,
}
