// In-memory session store
//
// One user, one session, one active request at a time: handlers read a
// session copy, run the workflow operation, and write the result back.
// Sessions do not survive a process restart; only provider-side
// interaction ids outlive us.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::WorkflowSession;

#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<Uuid, WorkflowSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a fresh session
    pub fn create(&self) -> WorkflowSession {
        let session = WorkflowSession::new();
        self.inner
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<WorkflowSession> {
        self.inner.lock().unwrap().get(id).cloned()
    }

    /// Write a mutated session back
    pub fn put(&self, session: WorkflowSession) {
        self.inner.lock().unwrap().insert(session.id, session);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkflowStage;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new();
        let session = store.create();

        let fetched = store.get(&session.id).unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.stage, WorkflowStage::Idle);
    }

    #[test]
    fn test_put_overwrites() {
        let store = SessionStore::new();
        let mut session = store.create();

        session.stage = WorkflowStage::Planned;
        store.put(session.clone());

        assert_eq!(store.get(&session.id).unwrap().stage, WorkflowStage::Planned);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = SessionStore::new();
        assert!(store.get(&uuid::Uuid::new_v4()).is_none());
    }
}
