// Workflow actions: plan, select tasks, research, analyze
//
// Each handler loads the session, runs one orchestrator operation, and
// writes the session back only when the operation returned Ok, so a
// failed external call never moves the stored state.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::WorkflowSession;
use crate::server::ServerAppState;
use crate::workflow;

use super::session_routes::lookup;
use super::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub target: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTasksRequest {
    /// Verbatim task numbers to keep selected
    pub numbers: Vec<String>,
}

pub async fn generate_plan(
    State(state): State<ServerAppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<WorkflowSession>, ApiError> {
    let mut session = lookup(&state, &id)?;

    workflow::generate_plan(&state.workflow, &mut session, &request.target).await?;
    state.sessions.put(session.clone());

    Ok(Json(session))
}

pub async fn select_tasks(
    State(state): State<ServerAppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectTasksRequest>,
) -> Result<Json<WorkflowSession>, ApiError> {
    let mut session = lookup(&state, &id)?;

    workflow::select_tasks(&mut session, &request.numbers)?;
    state.sessions.put(session.clone());

    Ok(Json(session))
}

/// Kick off deep research and block this request until the background
/// job leaves `in_progress` (bounded by the configured max wait)
pub async fn start_research(
    State(state): State<ServerAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowSession>, ApiError> {
    let mut session = lookup(&state, &id)?;

    workflow::start_research(&state.workflow, &mut session).await?;
    state.sessions.put(session.clone());

    Ok(Json(session))
}

pub async fn run_analysis(
    State(state): State<ServerAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowSession>, ApiError> {
    let mut session = lookup(&state, &id)?;

    workflow::run_analysis(&state.workflow, &mut session).await?;
    state.sessions.put(session.clone());

    Ok(Json(session))
}
