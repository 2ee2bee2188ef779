//! Per-conversation session state.
//!
//! The store is an injected object, shared process-wide behind an `Arc`.
//! A session is created lazily on first reference, seeded with the fixed
//! system instruction, and discarded whole when cleared. There is no
//! expiry: sessions live until the booking resolves (a known growth risk,
//! recorded in DESIGN.md).
//!
//! Turn handling works on a snapshot of the session which is written back
//! when the turn completes. Two racing requests for the same key therefore
//! resolve last-write-wins; turns for different keys are fully independent.

use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use maitred_core::dialogue::{system_prompt, Turn};
use maitred_core::reservation::ReservationDraft;

/// Opaque session key. Generated by the transport when the client does not
/// supply one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// Append-only transcript; the first turn is always the system
    /// instruction.
    pub transcript: Vec<Turn>,
    /// Populated only between a validated `save_reservation` tool call and
    /// the terminal resolution of the confirmation phase.
    pub collected: Option<ReservationDraft>,
}

impl Session {
    fn new() -> Self {
        Self { transcript: vec![Turn::system(system_prompt())], collected: None }
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the session for `id`, creating and storing a fresh one when
    /// the key is unknown. Never fails.
    pub async fn snapshot(&self, id: &SessionId) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(id.clone()).or_insert_with(Session::new).clone()
    }

    /// Write back the session produced by a completed turn.
    pub async fn replace(&self, id: &SessionId, session: Session) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(id.clone(), session);
    }

    /// Discard the whole session. Idempotent: clearing an unknown key is a
    /// no-op.
    pub async fn clear(&self, id: &SessionId) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(id);
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.lock().await.contains_key(id)
    }

    /// Number of sessions currently held, cleared ones excluded. Surfaced
    /// through the health endpoint as a load signal.
    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use maitred_core::dialogue::{Role, Turn};
    use maitred_core::reservation::ReservationDraft;

    use super::{SessionId, SessionStore};

    #[tokio::test]
    async fn snapshot_creates_a_session_seeded_with_the_system_turn() {
        let store = SessionStore::new();
        let id = SessionId::generate();

        let session = store.snapshot(&id).await;
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].role, Role::System);
        assert_eq!(session.collected, None);
        assert!(store.contains(&id).await);
    }

    #[tokio::test]
    async fn replace_persists_turn_mutations() {
        let store = SessionStore::new();
        let id = SessionId::new("sess-1");

        let mut session = store.snapshot(&id).await;
        session.transcript.push(Turn::user("table for two"));
        session.collected = Some(ReservationDraft {
            date: "2025-06-01".to_string(),
            time: "20:00".to_string(),
            guests: 2,
            name: "Ada".to_string(),
            contact: "ada@example.com".to_string(),
        });
        store.replace(&id, session.clone()).await;

        assert_eq!(store.snapshot(&id).await, session);
    }

    #[tokio::test]
    async fn clear_discards_the_whole_session_and_is_idempotent() {
        let store = SessionStore::new();
        let id = SessionId::new("sess-2");

        store.snapshot(&id).await;
        store.clear(&id).await;
        assert!(!store.contains(&id).await);
        // Clearing an unknown key must be a no-op.
        store.clear(&id).await;

        // The next reference starts from scratch.
        let fresh = store.snapshot(&id).await;
        assert_eq!(fresh.transcript.len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent_across_keys() {
        let store = SessionStore::new();
        let first = SessionId::new("sess-a");
        let second = SessionId::new("sess-b");

        let mut session = store.snapshot(&first).await;
        session.transcript.push(Turn::user("hello"));
        store.replace(&first, session).await;

        assert_eq!(store.snapshot(&second).await.transcript.len(), 1);
        assert_eq!(store.snapshot(&first).await.transcript.len(), 2);
    }

    #[tokio::test]
    async fn active_count_tracks_live_sessions() {
        let store = SessionStore::new();
        assert_eq!(store.active_count().await, 0);

        store.snapshot(&SessionId::new("sess-x")).await;
        store.snapshot(&SessionId::new("sess-y")).await;
        assert_eq!(store.active_count().await, 2);

        store.clear(&SessionId::new("sess-x")).await;
        assert_eq!(store.active_count().await, 1);
    }
}
