//! Server application state shared across handlers

use std::sync::Arc;

use crate::workflow::WorkflowContext;

use super::auth::AuthState;
use super::sessions::SessionStore;

/// Shared state for the server: auth, the session store, and the
/// workflow dependencies (provider client, artifact store, broadcaster).
#[derive(Clone)]
pub struct ServerAppState {
    /// Password check and issued bearer tokens
    pub auth: Arc<AuthState>,

    /// In-memory workflow sessions
    pub sessions: Arc<SessionStore>,

    /// Dependencies for workflow operations
    pub workflow: Arc<WorkflowContext>,
}

impl ServerAppState {
    pub fn new(auth: AuthState, workflow: WorkflowContext) -> Self {
        Self {
            auth: Arc::new(auth),
            sessions: Arc::new(SessionStore::new()),
            workflow: Arc::new(workflow),
        }
    }
}
