//! Ordered session collection with an active cursor.
//!
//! The store always holds at least one session and its active cursor is
//! a [`SessionId`], so closing or reordering tabs never leaves it dangling.

use crate::session::{Session, SessionId, SessionPatch};

/// Ordered collection of sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active: SessionId,
}

impl SessionStore {
    /// Create a store with a single default session.
    pub fn new() -> Self {
        let session = Session::new();
        let active = session.id;
        Self {
            sessions: vec![session],
            active,
        }
    }

    /// Append a new default session and make it active.
    pub fn create_session(&mut self) -> SessionId {
        let session = Session::new();
        let id = session.id;
        self.sessions.push(session);
        self.active = id;
        tracing::debug!("Created {} ({} open)", id, self.sessions.len());
        id
    }

    /// Close a session.
    ///
    /// Closing the only session, or an unknown one, does nothing. When the
    /// active session closes, its left neighbour becomes active (or the new
    /// first session when it was first).
    ///
    /// Returns whether a session was removed.
    pub fn close_session(&mut self, id: SessionId) -> bool {
        if self.sessions.len() == 1 {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };

        self.sessions.remove(index);
        if self.active == id {
            self.active = self.sessions[index.saturating_sub(1)].id;
        }
        tracing::debug!("Closed {} ({} open)", id, self.sessions.len());
        true
    }

    /// Make a session active. Unknown ids are ignored.
    pub fn set_active(&mut self, id: SessionId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.active = id;
        true
    }

    /// Merge changes into the active session only.
    pub fn update_active(&mut self, patch: SessionPatch) {
        let active = self.active_mut();
        active.apply(patch);
    }

    /// The active session.
    pub fn active(&self) -> &Session {
        // The cursor always names a stored session.
        &self.sessions[self.active_index()]
    }

    pub(crate) fn active_mut(&mut self) -> &mut Session {
        let index = self.active_index();
        &mut self.sessions[index]
    }

    pub fn active_id(&self) -> SessionId {
        self.active
    }

    /// Tab position of the active session.
    pub fn active_index(&self) -> usize {
        self.position(self.active).unwrap_or(0)
    }

    /// Tab position of a session.
    pub fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions. The only session cannot be
    /// closed, so this returns false.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions in tab order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
