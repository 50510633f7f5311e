//! HTTP route handlers, organized by domain:
//! - auth_routes: password login
//! - session_routes: session lifecycle (create, fetch, reset)
//! - workflow_routes: plan / select-tasks / research / analyze

pub mod auth_routes;
pub mod session_routes;
pub mod workflow_routes;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

use crate::error::WorkflowError;

/// Error envelope returned by every handler: a status code plus the
/// fault message, verbatim, so the client can show it to the user
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        let status = match &error {
            // Wrong stage for the requested action
            WorkflowError::Stage(_) => StatusCode::CONFLICT,

            // Bad or premature input
            WorkflowError::EmptyTarget
            | WorkflowError::MissingPlan
            | WorkflowError::NoTasksSelected
            | WorkflowError::MissingResearch => StatusCode::BAD_REQUEST,

            // Upstream faults, surfaced verbatim
            WorkflowError::Provider(_)
            | WorkflowError::ResearchFailed { .. }
            | WorkflowError::PollTimeout { .. }
            | WorkflowError::Template(_) => StatusCode::BAD_GATEWAY,
        };

        Self::new(status, error.to_string())
    }
}
