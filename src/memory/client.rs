//! HTTP client for the remote memory API.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info};
use url::Url;

use super::error::{Error, Result};
use super::types::{
    AddRequest, ListResponse, MemoryLists, MemoryRecord, OUTPUT_FORMAT, OwnerSelector,
    SearchRequest,
};

/// Operations the playground needs from a memory service.
///
/// Every method validates its inputs before touching the network and fails
/// with [`Error::Validation`] when a required value is blank.
#[async_trait]
pub trait MemoryApi: Send + Sync {
    /// Fetch the user and agent lists. Succeeds only if both requests do.
    async fn list_memories(
        &self,
        api_key: &str,
        user_id: &str,
        agent_id: &str,
    ) -> Result<MemoryLists>;

    /// Store `text` as a memory attributed to exactly one owner.
    async fn add_memory(
        &self,
        api_key: &str,
        owner: OwnerSelector,
        owner_id: &str,
        text: &str,
    ) -> Result<()>;

    /// Search the active owner's memories.
    async fn search_memories(
        &self,
        api_key: &str,
        owner: OwnerSelector,
        user_id: &str,
        agent_id: &str,
        query: &str,
    ) -> Result<Vec<MemoryRecord>>;
}

/// HTTP client for the memory API.
///
/// # Example
///
/// ```rust,no_run
/// use memory_playground::memory::{MemoryApi, MemoryClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MemoryClient::new("http://localhost:8000")?;
/// let lists = client.list_memories("token", "alice", "haruka").await?;
/// println!("{} user memories", lists.user.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryClient {
    base_url: Url,
    http: reqwest::Client,
}

impl MemoryClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root the `/api/*` paths are resolved against
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn auth(api_key: &str) -> String {
        format!("Token {api_key}")
    }

    async fn list_for(&self, api_key: &str, owner: OwnerSelector, id: &str) -> Result<ListResponse> {
        let key = match owner {
            OwnerSelector::User => "user_id",
            OwnerSelector::Agent => "agent_id",
        };
        let response = self
            .http
            .get(self.url("/api/get")?)
            .query(&[(key, id), ("output_format", OUTPUT_FORMAT)])
            .header(AUTHORIZATION, Self::auth(api_key))
            .send()
            .await?;
        let body = Self::check_status(response).await?.bytes().await?;
        if body.is_empty() {
            return Ok(ListResponse::default());
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(Error::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(message))
    } else {
        Ok(())
    }
}

#[async_trait]
impl MemoryApi for MemoryClient {
    async fn list_memories(
        &self,
        api_key: &str,
        user_id: &str,
        agent_id: &str,
    ) -> Result<MemoryLists> {
        require(api_key, "API key is required")?;
        require(user_id, "User ID is required")?;
        require(agent_id, "Agent ID is required")?;

        let (user, agent) = futures::future::try_join(
            self.list_for(api_key, OwnerSelector::User, user_id),
            self.list_for(api_key, OwnerSelector::Agent, agent_id),
        )
        .await?;

        let lists = MemoryLists {
            user: user.into_results(),
            agent: agent.into_results(),
        };
        info!(
            name: "memory.list.completed",
            user_count = lists.user.len(),
            agent_count = lists.agent.len(),
            "Fetched memories"
        );
        Ok(lists)
    }

    async fn add_memory(
        &self,
        api_key: &str,
        owner: OwnerSelector,
        owner_id: &str,
        text: &str,
    ) -> Result<()> {
        require(api_key, "API key is required")?;
        require(owner_id, "Owner ID is required")?;
        require(text, "Memory text is required")?;

        let req = AddRequest::new(owner, owner_id, text);
        let response = self
            .http
            .post(self.url("/api/add")?)
            .header(AUTHORIZATION, Self::auth(api_key))
            .json(&req)
            .send()
            .await?;
        Self::check_status(response).await?;

        info!(name: "memory.add.completed", owner = %owner, "Memory added");
        Ok(())
    }

    async fn search_memories(
        &self,
        api_key: &str,
        owner: OwnerSelector,
        user_id: &str,
        agent_id: &str,
        query: &str,
    ) -> Result<Vec<MemoryRecord>> {
        require(api_key, "API key is required")?;
        match owner {
            OwnerSelector::User => require(user_id, "User ID is required")?,
            OwnerSelector::Agent => require(agent_id, "Agent ID is required")?,
        }
        require(query, "Search query is required")?;

        let req = SearchRequest::new(owner, user_id, agent_id, query);
        let response = self
            .http
            .post(self.url("/api/search")?)
            .header(AUTHORIZATION, Self::auth(api_key))
            .json(&req)
            .send()
            .await?;
        let results: Option<Vec<MemoryRecord>> = Self::check_status(response).await?.json().await?;
        let results = results.unwrap_or_default();

        debug!(name: "memory.search.completed", owner = %owner, hits = results.len());
        Ok(results)
    }
}
