// Password login issuing bearer tokens

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::server::ServerAppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
}

/// Exchange the application password for a bearer token.
///
/// A mismatch re-prompts with 401; there is no lockout or retry limit.
pub async fn login(
    State(state): State<ServerAppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.auth.verify_password(&request.password) {
        log::warn!("Rejected login with wrong password");
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let token = state.auth.issue_token();
    log::info!("Issued auth token");

    Ok(Json(LoginResponse { token }))
}
