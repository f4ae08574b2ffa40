//! Playground session state and its update function.
//!
//! All mutation goes through [`SessionState::update`]. Starting a remote
//! operation yields a [`Command`] stamped with a request generation; the
//! caller runs it and feeds the [`Outcome`] back as [`Action::Complete`].
//! Completions from anything but the latest generation are dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::memory::{MemoryLists, MemoryRecord, OwnerSelector};
use crate::settings::Credentials;

/// Bar height bounds used by the visualize tab, in pixels.
const BAR_MIN_HEIGHT: usize = 20;
const BAR_MAX_HEIGHT: usize = 200;
const BAR_PX_PER_MEMORY: usize = 10;

/// Playground tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Add,
    Search,
    Visualize,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Add, Tab::Search, Tab::Visualize];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Search => "search",
            Self::Visualize => "visualize",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "Add Memory",
            Self::Search => "Search",
            Self::Visualize => "Visualize",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "search" => Ok(Self::Search),
            "visualize" => Ok(Self::Visualize),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// Remote operations a session can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Add,
    Search,
}

impl Operation {
    /// Message shown when required input is missing.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::List => "API key, User ID, and Agent ID are required",
            Self::Add => "API key, ID, and memory text are required",
            Self::Search => "API key, IDs, and query text are required",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Self::List => "Error fetching memories",
            Self::Add => "Error adding memory",
            Self::Search => "Error searching memories",
        }
    }
}

/// Loading indicator and last error, shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchState {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Memory counts captured by the last successful refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationData {
    pub user_count: usize,
    pub agent_count: usize,
}

impl VisualizationData {
    pub fn total(self) -> usize {
        self.user_count + self.agent_count
    }

    /// `user:agent`, e.g. `3:1`.
    pub fn ratio(self) -> String {
        format!("{}:{}", self.user_count, self.agent_count)
    }

    pub fn bar_height(count: usize) -> usize {
        count
            .saturating_mul(BAR_PX_PER_MEMORY)
            .clamp(BAR_MIN_HEIGHT, BAR_MAX_HEIGHT)
    }
}

/// A remote call the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List {
        api_key: String,
        user_id: String,
        agent_id: String,
    },
    Add {
        api_key: String,
        owner: OwnerSelector,
        owner_id: String,
        text: String,
    },
    Search {
        api_key: String,
        owner: OwnerSelector,
        user_id: String,
        agent_id: String,
        query: String,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Self::List { .. } => Operation::List,
            Self::Add { .. } => Operation::Add,
            Self::Search { .. } => Operation::Search,
        }
    }
}

/// A request tagged with the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub generation: u64,
    pub request: Request,
}

/// Result of running a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Listed(MemoryLists),
    Added,
    Searched(Vec<MemoryRecord>),
    Failed {
        operation: Operation,
        message: String,
    },
}

/// Everything that can change a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetApiKey(String),
    SetUserId(String),
    SetAgentId(String),
    SetMemoryInput(String),
    SetQueryInput(String),
    SelectTab(Tab),
    SelectOwner(OwnerSelector),
    Begin(Operation),
    Complete { generation: u64, outcome: Outcome },
}

/// State of one playground session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub credentials: Credentials,
    pub memory_input: String,
    pub query_input: String,
    pub active_tab: Tab,
    pub owner: OwnerSelector,
    pub fetch: FetchState,
    pub user_memories: Vec<MemoryRecord>,
    pub agent_memories: Vec<MemoryRecord>,
    pub search_results: Vec<MemoryRecord>,
    pub visualization: Option<VisualizationData>,
    /// Generation of the most recently started request.
    pub generation: u64,
}

impl SessionState {
    /// Fresh state seeded with stored credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Apply `action`, returning the remote call to perform next, if any.
    pub fn update(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::SetApiKey(v) => self.credentials.api_key = v,
            Action::SetUserId(v) => self.credentials.user_id = v,
            Action::SetAgentId(v) => self.credentials.agent_id = v,
            Action::SetMemoryInput(v) => self.memory_input = v,
            Action::SetQueryInput(v) => self.query_input = v,
            Action::SelectTab(tab) => self.active_tab = tab,
            Action::SelectOwner(owner) => self.owner = owner,
            Action::Begin(operation) => return self.begin(operation),
            Action::Complete {
                generation,
                outcome,
            } => return self.complete(generation, outcome),
        }
        None
    }

    /// Memories of the currently selected owner.
    pub fn owner_memories(&self) -> &[MemoryRecord] {
        match self.owner {
            OwnerSelector::User => &self.user_memories,
            OwnerSelector::Agent => &self.agent_memories,
        }
    }

    /// Id field matching the selected owner.
    pub fn owner_id(&self) -> &str {
        match self.owner {
            OwnerSelector::User => &self.credentials.user_id,
            OwnerSelector::Agent => &self.credentials.agent_id,
        }
    }

    fn begin(&mut self, operation: Operation) -> Option<Command> {
        let Some(request) = self.request_for(operation) else {
            self.fetch.error = Some(operation.guidance().to_string());
            return None;
        };

        self.generation += 1;
        self.fetch.is_loading = true;
        self.fetch.error = None;
        if operation == Operation::Search {
            self.search_results.clear();
        }

        Some(Command {
            generation: self.generation,
            request,
        })
    }

    fn request_for(&self, operation: Operation) -> Option<Request> {
        let creds = &self.credentials;
        if !creds.is_complete() {
            return None;
        }

        match operation {
            Operation::List => Some(Request::List {
                api_key: creds.api_key.clone(),
                user_id: creds.user_id.clone(),
                agent_id: creds.agent_id.clone(),
            }),
            Operation::Add => {
                let text = self.memory_input.trim();
                (!text.is_empty()).then(|| Request::Add {
                    api_key: creds.api_key.clone(),
                    owner: self.owner,
                    owner_id: self.owner_id().to_string(),
                    text: text.to_string(),
                })
            }
            Operation::Search => {
                let query = self.query_input.trim();
                (!query.is_empty()).then(|| Request::Search {
                    api_key: creds.api_key.clone(),
                    owner: self.owner,
                    user_id: creds.user_id.clone(),
                    agent_id: creds.agent_id.clone(),
                    query: query.to_string(),
                })
            }
        }
    }

    fn complete(&mut self, generation: u64, outcome: Outcome) -> Option<Command> {
        if generation != self.generation {
            debug!(
                name: "session.completion.stale",
                generation,
                current = self.generation,
                "Discarding stale completion"
            );
            return None;
        }

        self.fetch.is_loading = false;
        match outcome {
            Outcome::Listed(lists) => {
                self.visualization = Some(VisualizationData {
                    user_count: lists.user.len(),
                    agent_count: lists.agent.len(),
                });
                self.user_memories = lists.user;
                self.agent_memories = lists.agent;
                self.fetch.error = None;
                None
            }
            Outcome::Added => {
                self.memory_input.clear();
                self.fetch.error = None;
                self.begin(Operation::List)
            }
            Outcome::Searched(results) => {
                self.search_results = results;
                self.fetch.error = None;
                None
            }
            Outcome::Failed { operation, message } => {
                self.fetch.error = Some(format!("{}: {message}", operation.failure_prefix()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(memory: &str) -> MemoryRecord {
        MemoryRecord {
            memory: memory.to_string(),
            ..MemoryRecord::default()
        }
    }

    fn ready_state() -> SessionState {
        SessionState::new(Credentials {
            api_key: "k".into(),
            user_id: "alice".into(),
            agent_id: "haruka".into(),
        })
    }

    #[test]
    fn test_begin_without_credentials_sets_guidance() {
        let mut state = SessionState::default();

        assert!(state.update(Action::Begin(Operation::List)).is_none());
        assert!(!state.fetch.is_loading);
        assert_eq!(
            state.fetch.error.as_deref(),
            Some("API key, User ID, and Agent ID are required")
        );
        assert_eq!(state.generation, 0);
    }

    #[test]
    fn test_blank_text_and_query_are_rejected() {
        let mut state = ready_state();

        for blank in ["", "   ", "\n\t"] {
            state.update(Action::SetMemoryInput(blank.into()));
            assert!(state.update(Action::Begin(Operation::Add)).is_none());
            assert_eq!(state.fetch.error.as_deref(), Some(Operation::Add.guidance()));

            state.update(Action::SetQueryInput(blank.into()));
            assert!(state.update(Action::Begin(Operation::Search)).is_none());
            assert_eq!(
                state.fetch.error.as_deref(),
                Some(Operation::Search.guidance())
            );
        }
        assert_eq!(state.generation, 0);
    }

    #[test]
    fn test_add_targets_selected_owner() {
        let mut state = ready_state();
        state.update(Action::SelectOwner(OwnerSelector::Agent));
        state.update(Action::SetMemoryInput("  prefers brevity ".into()));

        let command = state.update(Action::Begin(Operation::Add)).unwrap();
        assert_eq!(
            command.request,
            Request::Add {
                api_key: "k".into(),
                owner: OwnerSelector::Agent,
                owner_id: "haruka".into(),
                text: "prefers brevity".into(),
            }
        );
        assert!(state.fetch.is_loading);
    }

    #[test]
    fn test_successful_add_clears_input_and_chains_refresh() {
        let mut state = ready_state();
        state.update(Action::SetMemoryInput("likes tea".into()));
        let add = state.update(Action::Begin(Operation::Add)).unwrap();

        let refresh = state
            .update(Action::Complete {
                generation: add.generation,
                outcome: Outcome::Added,
            })
            .unwrap();

        assert_eq!(state.memory_input, "");
        assert_eq!(refresh.request.operation(), Operation::List);
        assert_eq!(refresh.generation, add.generation + 1);
        assert!(state.fetch.is_loading);
    }

    #[test]
    fn test_failed_list_keeps_previous_sets() {
        let mut state = ready_state();
        state.user_memories = vec![record("old user")];
        state.agent_memories = vec![record("old agent")];

        let cmd = state.update(Action::Begin(Operation::List)).unwrap();
        state.update(Action::Complete {
            generation: cmd.generation,
            outcome: Outcome::Failed {
                operation: Operation::List,
                message: "request failed with status 500: boom".into(),
            },
        });

        assert_eq!(state.user_memories, vec![record("old user")]);
        assert_eq!(state.agent_memories, vec![record("old agent")]);
        assert!(!state.fetch.is_loading);
        assert_eq!(
            state.fetch.error.as_deref(),
            Some("Error fetching memories: request failed with status 500: boom")
        );
        assert!(state.visualization.is_none());
    }

    #[test]
    fn test_search_clears_results_eagerly() {
        let mut state = ready_state();
        state.search_results = vec![record("stale")];
        state.update(Action::SetQueryInput("tea".into()));

        let cmd = state.update(Action::Begin(Operation::Search)).unwrap();
        assert!(state.search_results.is_empty());

        state.update(Action::Complete {
            generation: cmd.generation,
            outcome: Outcome::Failed {
                operation: Operation::Search,
                message: "offline".into(),
            },
        });
        assert!(state.search_results.is_empty());
        assert_eq!(
            state.fetch.error.as_deref(),
            Some("Error searching memories: offline")
        );
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut state = ready_state();
        state.update(Action::SetQueryInput("tea".into()));

        let list = state.update(Action::Begin(Operation::List)).unwrap();
        let search = state.update(Action::Begin(Operation::Search)).unwrap();

        state.update(Action::Complete {
            generation: search.generation,
            outcome: Outcome::Searched(vec![record("tea")]),
        });
        assert!(!state.fetch.is_loading);

        state.update(Action::Complete {
            generation: list.generation,
            outcome: Outcome::Listed(MemoryLists {
                user: vec![record("late")],
                agent: vec![],
            }),
        });
        assert!(state.user_memories.is_empty());
        assert_eq!(state.search_results, vec![record("tea")]);
        assert!(!state.fetch.is_loading);
    }

    #[test]
    fn test_local_selection_never_issues_commands() {
        let mut state = ready_state();
        assert!(state.update(Action::SelectOwner(OwnerSelector::Agent)).is_none());
        assert!(state.update(Action::SelectTab(Tab::Visualize)).is_none());
        assert_eq!(state.generation, 0);
        assert_eq!(state.owner_id(), "haruka");
    }

    #[test]
    fn test_visualization_numbers() {
        let data = VisualizationData {
            user_count: 3,
            agent_count: 40,
        };
        assert_eq!(data.total(), 43);
        assert_eq!(data.ratio(), "3:40");
        assert_eq!(VisualizationData::bar_height(0), 20);
        assert_eq!(VisualizationData::bar_height(3), 30);
        assert_eq!(VisualizationData::bar_height(40), 200);
    }

    #[test]
    fn test_state_serializes() {
        let state = ready_state();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["active_tab"], "add");
        assert_eq!(json["owner"], "user");
        let back: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
