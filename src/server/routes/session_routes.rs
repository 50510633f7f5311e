// Session lifecycle: create, fetch, reset

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::models::WorkflowSession;
use crate::server::ServerAppState;
use crate::workflow;

use super::ApiError;

pub async fn create_session(State(state): State<ServerAppState>) -> Json<WorkflowSession> {
    let session = state.sessions.create();
    log::info!("Created session {}", session.id);
    Json(session)
}

pub async fn get_session(
    State(state): State<ServerAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowSession>, ApiError> {
    let session = lookup(&state, &id)?;
    Ok(Json(session))
}

/// Clear every workflow field; the caller's auth token stays valid
pub async fn reset_session(
    State(state): State<ServerAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowSession>, ApiError> {
    let mut session = lookup(&state, &id)?;

    workflow::reset(&state.workflow, &mut session);
    state.sessions.put(session.clone());

    Ok(Json(session))
}

pub(super) fn lookup(state: &ServerAppState, id: &Uuid) -> Result<WorkflowSession, ApiError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ApiError::not_found(format!("Unknown session: {}", id)))
}
