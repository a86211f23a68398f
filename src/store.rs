use std::collections::BTreeMap;
use std::fmt;

use crate::state::{Action, Reply, Session};

/// Handle of one open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session {}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no session with id {0}")]
    UnknownSession(SessionId),
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// All open sessions, keyed by id. Each action is routed to exactly one
/// session and never touches the others.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: BTreeMap<SessionId, Session>,
    next_id: u64,
}

impl SessionStore {
    /// Open an empty session.
    pub fn create(&mut self) -> SessionId {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        self.sessions.insert(id, Session::default());
        log::debug!("Opened {id}");
        id
    }

    /// Drop a session and everything it loaded.
    pub fn close(&mut self, id: SessionId) -> Result<(), StoreError> {
        self.sessions
            .remove(&id)
            .map(|_| log::debug!("Closed {id}"))
            .ok_or(StoreError::UnknownSession(id))
    }

    pub fn get(&self, id: SessionId) -> Result<&Session, StoreError> {
        self.sessions.get(&id).ok_or(StoreError::UnknownSession(id))
    }

    pub fn get_mut(&mut self, id: SessionId) -> Result<&mut Session, StoreError> {
        self.sessions
            .get_mut(&id)
            .ok_or(StoreError::UnknownSession(id))
    }

    /// Ids of open sessions, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }

    /// Handle one action against one session.
    pub fn dispatch(&mut self, id: SessionId, action: Action) -> Result<Reply, StoreError> {
        log::debug!("{id}: {}", action_label(&action));
        Ok(self.get_mut(id)?.handle(action))
    }
}

/// Short description for the log; uploads are not dumped byte for byte.
fn action_label(action: &Action) -> String {
    match action {
        Action::Upload(files) => format!(
            "Upload({})",
            files
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::UploadedFile;

    #[test]
    fn test_sessions_are_isolated() {
        let mut store = SessionStore::default();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);

        store
            .dispatch(
                a,
                Action::Upload(vec![UploadedFile::new("t.csv", b"x\n1\n".to_vec())]),
            )
            .unwrap();
        assert_eq!(store.get(a).unwrap().registry.len(), 1);
        assert!(store.get(b).unwrap().registry.is_empty());
    }

    #[test]
    fn test_unknown_session_is_an_error() {
        let mut store = SessionStore::default();
        let id = store.create();
        store.close(id).unwrap();
        assert_eq!(
            store.dispatch(id, Action::Clear),
            Err(StoreError::UnknownSession(id))
        );
        assert_eq!(store.close(id), Err(StoreError::UnknownSession(id)));
        assert_eq!(store.ids().count(), 0);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut store = SessionStore::default();
        let first = store.create();
        store.close(first).unwrap();
        let second = store.create();
        assert_ne!(first, second);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![second]);
    }
}
