//! Client for the remote memory service.
//!
//! # Structure
//!
//! - [`client`]: [`MemoryApi`] trait and its reqwest-backed [`MemoryClient`]
//! - [`types`]: request/response payloads with explicit fallbacks
//! - [`error`]: validation vs. fetch failures

pub mod client;
pub mod error;
pub mod types;

pub use client::{MemoryApi, MemoryClient};
pub use error::{Error, ErrorKind, Result};
pub use types::{MemoryLists, MemoryRecord, OwnerSelector};
