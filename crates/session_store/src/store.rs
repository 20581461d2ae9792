use std::fmt;

use tracing::{info, warn};

use crate::error::SessionStoreError;
use crate::identity::generate_session_id;
use crate::kv::KeyValueStore;

/// Persisted key holding the session identifier.
pub const SESSION_ID_KEY: &str = "session_id";

/// Owns the client's single session identifier.
///
/// The in-memory id is authoritative for new requests; every mutation is
/// written through to the backing [`KeyValueStore`]. Rotation only happens
/// through [`SessionStore::rotate`], driven by ids the server returns.
pub struct SessionStore {
    pub(crate) kv: Box<dyn KeyValueStore>,
    id: String,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").field("id", &self.id).finish()
    }
}

impl SessionStore {
    /// Loads the persisted id, or generates and persists a fresh one.
    ///
    /// Never fails: a store that cannot persist still yields a usable
    /// in-memory id, and the failure is logged.
    pub fn ensure(kv: Box<dyn KeyValueStore>) -> Self {
        Self::ensure_with(kv, generate_session_id)
    }

    pub fn ensure_with(mut kv: Box<dyn KeyValueStore>, generate: impl FnOnce() -> String) -> Self {
        if let Some(id) = kv.get(SESSION_ID_KEY).filter(|id| !id.trim().is_empty()) {
            return Self { kv, id };
        }

        let id = generate();
        if let Err(error) = kv.set(SESSION_ID_KEY, &id) {
            warn!(%error, "failed to persist generated session id");
        }
        info!(session_id = %id, "generated new session id");
        Self { kv, id }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the id and writes it through.
    ///
    /// The in-memory value is updated even when persistence fails, so later
    /// requests use the new id either way.
    pub fn set(&mut self, id: &str) -> Result<(), SessionStoreError> {
        if id.trim().is_empty() {
            return Err(SessionStoreError::EmptySessionId);
        }
        self.id = id.to_owned();
        self.kv.set(SESSION_ID_KEY, id)
    }

    /// Adopts a server-provided id when it differs from the current one.
    ///
    /// Returns `Ok(true)` when the id changed. Absent or empty candidates are
    /// ignored.
    pub fn rotate(&mut self, candidate: Option<&str>) -> Result<bool, SessionStoreError> {
        let Some(candidate) = candidate.filter(|value| !value.is_empty()) else {
            return Ok(false);
        };
        if candidate == self.id {
            return Ok(false);
        }

        info!(from = %self.id, to = %candidate, "rotating session id");
        self.set(candidate)?;
        Ok(true)
    }
}
