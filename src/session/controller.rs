//! Drives a session: user actions in, remote calls out.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::memory::{MemoryApi, OwnerSelector};
use crate::settings::{SettingsField, SettingsStore};

use super::state::{Action, Command, Operation, Outcome, Request, SessionState, Tab};
use super::view::PlaygroundView;

/// Which form a key press came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    Add,
    Search,
}

/// One playground session.
///
/// The state lock is only held while the reducer runs, never across a remote
/// call, so overlapping operations proceed concurrently.
pub struct PlaygroundController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    id: String,
    api: Arc<dyn MemoryApi>,
    settings: SettingsStore,
    state: RwLock<SessionState>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl fmt::Debug for PlaygroundController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaygroundController")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

impl Clone for PlaygroundController {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl PlaygroundController {
    /// Create a controller seeded from the settings store.
    pub fn new(id: impl Into<String>, api: Arc<dyn MemoryApi>, settings: SettingsStore) -> Self {
        let state = SessionState::new(settings.load());
        Self {
            inner: Arc::new(ControllerInner {
                id: id.into(),
                api,
                settings,
                state: RwLock::new(state),
                last_activity: RwLock::new(Utc::now()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.read().unwrap().clone()
    }

    /// Render-ready view. Viewing counts as activity.
    #[must_use]
    pub fn view(&self) -> PlaygroundView {
        self.touch();
        PlaygroundView::derive(&self.inner.state.read().unwrap())
    }

    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.inner.last_activity.read().unwrap()
    }

    /// Initial refresh, only when stored credentials are complete.
    pub async fn bootstrap(&self) {
        if self.state().credentials.is_complete() {
            self.refresh().await;
        }
    }

    /// List both owners' memories (Connect / Refresh).
    pub async fn refresh(&self) {
        self.dispatch(Action::Begin(Operation::List)).await;
    }

    /// Add the current memory input for the selected owner.
    pub async fn add(&self) {
        self.dispatch(Action::Begin(Operation::Add)).await;
    }

    /// Search the selected owner's memories with the current query input.
    pub async fn search(&self) {
        self.dispatch(Action::Begin(Operation::Search)).await;
    }

    /// Enter submits the matching form unless a request is in flight.
    ///
    /// Returns whether an operation was started.
    pub async fn key_press(&self, key: &str, target: KeyTarget) -> bool {
        if key != "Enter" || self.state().fetch.is_loading {
            return false;
        }
        match target {
            KeyTarget::Add => self.add().await,
            KeyTarget::Search => self.search().await,
        }
        true
    }

    pub fn select_tab(&self, tab: Tab) {
        self.apply(Action::SelectTab(tab));
    }

    pub fn select_owner(&self, owner: OwnerSelector) {
        self.apply(Action::SelectOwner(owner));
    }

    pub fn set_memory_input(&self, text: impl Into<String>) {
        self.apply(Action::SetMemoryInput(text.into()));
    }

    pub fn set_query_input(&self, query: impl Into<String>) {
        self.apply(Action::SetQueryInput(query.into()));
    }

    /// Update a credential field and persist it.
    pub fn set_field(&self, field: SettingsField, value: impl Into<String>) {
        let value = value.into();
        let action = match field {
            SettingsField::ApiKey => Action::SetApiKey(value.clone()),
            SettingsField::UserId => Action::SetUserId(value.clone()),
            SettingsField::AgentId => Action::SetAgentId(value.clone()),
        };
        self.apply(action);

        if let Err(e) = self.inner.settings.save(field, value) {
            warn!(
                name: "settings.save.failed",
                field = ?field,
                error = %e,
                "Failed to persist setting"
            );
        }
    }

    /// Feed `action` to the reducer and run whatever it asks for, including
    /// chained follow-ups such as the refresh after an add.
    pub async fn dispatch(&self, action: Action) {
        let mut next = self.apply(action);
        while let Some(Command {
            generation,
            request,
        }) = next
        {
            let outcome = self.execute(request).await;
            next = self.apply(Action::Complete {
                generation,
                outcome,
            });
        }
    }

    fn apply(&self, action: Action) -> Option<Command> {
        self.touch();
        self.inner.state.write().unwrap().update(action)
    }

    fn touch(&self) {
        *self.inner.last_activity.write().unwrap() = Utc::now();
    }

    async fn execute(&self, request: Request) -> Outcome {
        let operation = request.operation();
        info!(
            name: "session.request.started",
            session_id = %self.inner.id,
            operation = ?operation,
        );

        let api = &self.inner.api;
        let result = match request {
            Request::List {
                api_key,
                user_id,
                agent_id,
            } => api
                .list_memories(&api_key, &user_id, &agent_id)
                .await
                .map(Outcome::Listed),
            Request::Add {
                api_key,
                owner,
                owner_id,
                text,
            } => api
                .add_memory(&api_key, owner, &owner_id, &text)
                .await
                .map(|()| Outcome::Added),
            Request::Search {
                api_key,
                owner,
                user_id,
                agent_id,
                query,
            } => api
                .search_memories(&api_key, owner, &user_id, &agent_id, &query)
                .await
                .map(Outcome::Searched),
        };

        result.unwrap_or_else(|e| {
            warn!(
                name: "session.request.failed",
                session_id = %self.inner.id,
                operation = ?operation,
                error = %e,
                "Memory request failed"
            );
            Outcome::Failed {
                operation,
                message: e.to_string(),
            }
        })
    }
}
