//! Registry of live playground sessions.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::memory::MemoryApi;
use crate::settings::SettingsStore;

use super::controller::PlaygroundController;

/// Default session timeout (30 minutes).
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Thread-safe store for sessions.
///
/// Every session it creates shares the same memory client and settings store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    api: Arc<dyn MemoryApi>,
    settings: SettingsStore,
    sessions: RwLock<HashMap<String, PlaygroundController>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new(api: Arc<dyn MemoryApi>, settings: SettingsStore) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                api,
                settings,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new session and return it.
    #[must_use]
    pub fn create(&self) -> PlaygroundController {
        let id = Uuid::new_v4().to_string();
        let session = PlaygroundController::new(
            id.clone(),
            Arc::clone(&self.inner.api),
            self.inner.settings.clone(),
        );
        self.inner
            .sessions
            .write()
            .unwrap()
            .insert(id, session.clone());
        session
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<PlaygroundController> {
        self.inner.sessions.read().unwrap().get(id).cloned()
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<PlaygroundController> {
        self.inner.sessions.write().unwrap().remove(id)
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all expired sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Remove sessions that have been inactive longer than the timeout.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let now = Utc::now();
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, session| {
            (now - session.last_activity())
                .to_std()
                .map_or(true, |idle| idle <= timeout)
        });
        before - guard.len()
    }
}
