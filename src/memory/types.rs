//! Wire types for the remote memory API.
//!
//! Remote payloads are loosely shaped: lists may omit `results`, records may
//! omit any field. Every optional field has a defined fallback here so call
//! sites never have to coalesce nulls themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response format version requested from the remote API.
pub const OUTPUT_FORMAT: &str = "v1.1";

// =============================================================================
// Owner selector
// =============================================================================

/// Which persona an operation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerSelector {
    #[default]
    User,
    Agent,
}

impl OwnerSelector {
    /// Message role attached to memories added for this owner.
    pub fn role(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "assistant",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }

    /// Capitalized label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Agent => "Agent",
        }
    }
}

impl fmt::Display for OwnerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            other => Err(format!("unknown owner: {other}")),
        }
    }
}

// =============================================================================
// Memory records
// =============================================================================

/// A memory as returned by the remote service.
///
/// Fields the client does not interpret are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MemoryRecord {
    /// First eight characters of the id, or `N/A`.
    pub fn short_id(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.chars().take(8).collect(),
            _ => "N/A".to_string(),
        }
    }

    /// Parsed creation time: RFC 3339, or Unix seconds.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| raw.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0)))
    }

    /// Creation time for display; falls back to the current time.
    pub fn display_time(&self) -> String {
        self.created_at()
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Display-only fields: strings pass through, numbers are stringified and
/// anything else is dropped rather than failing the whole record.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Body of `GET /api/get`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub results: Option<Vec<MemoryRecord>>,
}

impl ListResponse {
    pub fn into_results(self) -> Vec<MemoryRecord> {
        self.results.unwrap_or_default()
    }
}

/// Both owner lists from a single refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryLists {
    pub user: Vec<MemoryRecord>,
    pub agent: Vec<MemoryRecord>,
}

// =============================================================================
// Requests
// =============================================================================

/// A single message submitted to `POST /api/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /api/add`. Exactly one owner id is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddRequest {
    pub messages: Vec<AddMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub output_format: String,
}

impl AddRequest {
    pub fn new(owner: OwnerSelector, owner_id: &str, text: &str) -> Self {
        let (user_id, agent_id) = owner_ids(owner, owner_id);
        Self {
            messages: vec![AddMessage {
                role: owner.role().to_string(),
                content: text.trim().to_string(),
            }],
            user_id,
            agent_id,
            output_format: OUTPUT_FORMAT.to_string(),
        }
    }
}

/// Body of `POST /api/search`. Only the active owner's id is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl SearchRequest {
    pub fn new(owner: OwnerSelector, user_id: &str, agent_id: &str, query: &str) -> Self {
        let owner_id = match owner {
            OwnerSelector::User => user_id,
            OwnerSelector::Agent => agent_id,
        };
        let (user_id, agent_id) = owner_ids(owner, owner_id);
        Self {
            query: query.trim().to_string(),
            user_id,
            agent_id,
        }
    }
}

fn owner_ids(owner: OwnerSelector, owner_id: &str) -> (Option<String>, Option<String>) {
    match owner {
        OwnerSelector::User => (Some(owner_id.to_string()), None),
        OwnerSelector::Agent => (None, Some(owner_id.to_string())),
    }
}
