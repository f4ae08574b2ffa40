//! Memory Playground
//!
//! An HTML-first playground for a hosted memory API: add, search and list
//! memories for a user or agent persona.
//!
//! # Architecture
//!
//! - **Server**: Axum router rendering the page and HTMX fragments
//! - **Sessions**: reducer-driven state per browser session
//! - **Memory Client**: reqwest client for the remote `/api/*` endpoints
//! - **Settings**: credentials persisted across restarts
//!
//! # Modules
//!
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`memory`]: remote API client and wire types
//! - [`session`]: session state, controller and view model
//! - [`settings`]: credential persistence
//! - [`ui`]: HTML rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod memory;
pub mod server;
pub mod session;
pub mod settings;
pub mod ui;

use crate::config::AppConfig;

use session::SessionStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live playground sessions.
    pub sessions: SessionStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
