//! Playground session state and management.
//!
//! Each browser session owns a [`SessionState`] that only changes through
//! [`SessionState::update`]. A [`PlaygroundController`] wraps it, runs the
//! remote calls the reducer asks for and derives the [`PlaygroundView`].
//!
//! # Architecture
//!
//! - [`state`]: reducer, actions and request generations
//! - [`controller`]: async driver over a [`MemoryApi`](crate::memory::MemoryApi)
//! - [`view`]: render-ready projection of the state
//! - [`SessionStore`]: thread-safe registry of live sessions
//!
//! # Example
//!
//! ```rust
//! use memory_playground::session::{Action, Operation, SessionState};
//! use memory_playground::settings::Credentials;
//!
//! let mut state = SessionState::new(Credentials {
//!     api_key: "k".into(),
//!     user_id: "alice".into(),
//!     agent_id: "haruka".into(),
//! });
//! state.update(Action::SetQueryInput("tea".into()));
//!
//! let command = state.update(Action::Begin(Operation::Search)).unwrap();
//! assert!(state.fetch.is_loading);
//! assert_eq!(command.generation, 1);
//! ```

pub mod controller;
pub mod state;
mod store;
pub mod view;

pub use controller::{KeyTarget, PlaygroundController};
pub use state::{
    Action, Command, FetchState, Operation, Outcome, Request, SessionState, Tab,
    VisualizationData,
};
pub use store::SessionStore;
pub use view::PlaygroundView;
