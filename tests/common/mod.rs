#![allow(dead_code)]

use async_trait::async_trait;
use memory_playground::config::DefaultsConfig;
use memory_playground::memory::{
    self, MemoryApi, MemoryLists, MemoryRecord, OwnerSelector,
};
use memory_playground::settings::{SettingsField, SettingsStore};
use std::sync::Mutex;
use tokio::sync::Notify;

pub mod stub;

/// A call observed by [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Add {
        owner: OwnerSelector,
        owner_id: String,
        text: String,
    },
    Search {
        owner: OwnerSelector,
        query: String,
    },
}

/// Scripted memory service.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    lists: Mutex<MemoryLists>,
    list_failure: Mutex<Option<u16>>,
    add_failure: Option<u16>,
    search_results: Vec<MemoryRecord>,
    list_gate: Option<Notify>,
    add_gate: Option<Notify>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lists(self, user: &[&str], agent: &[&str]) -> Self {
        *self.lists.lock().unwrap() = MemoryLists {
            user: user.iter().map(|m| record(m)).collect(),
            agent: agent.iter().map(|m| record(m)).collect(),
        };
        self
    }

    pub fn failing_lists(self, status: u16) -> Self {
        self.set_list_failure(Some(status));
        self
    }

    pub fn set_list_failure(&self, status: Option<u16>) {
        *self.list_failure.lock().unwrap() = status;
    }

    pub fn failing_adds(mut self, status: u16) -> Self {
        self.add_failure = Some(status);
        self
    }

    pub fn with_search_results(mut self, results: &[&str]) -> Self {
        self.search_results = results.iter().map(|m| record(m)).collect();
        self
    }

    /// Hold list calls until [`FakeApi::release_list`].
    pub fn gated(mut self) -> Self {
        self.list_gate = Some(Notify::new());
        self
    }

    pub fn release_list(&self) {
        if let Some(gate) = &self.list_gate {
            gate.notify_one();
        }
    }

    /// Hold add calls until [`FakeApi::release_add`].
    pub fn gated_adds(mut self) -> Self {
        self.add_gate = Some(Notify::new());
        self
    }

    pub fn release_add(&self) {
        if let Some(gate) = &self.add_gate {
            gate.notify_one();
        }
    }

    pub fn add_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Add { .. }))
            .count()
    }

    pub fn set_lists(&self, user: &[&str], agent: &[&str]) {
        *self.lists.lock().unwrap() = MemoryLists {
            user: user.iter().map(|m| record(m)).collect(),
            agent: agent.iter().map(|m| record(m)).collect(),
        };
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::List).count()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn status_error(status: u16) -> memory::Error {
    memory::Error::Status {
        status,
        message: "Internal Server Error".into(),
    }
}

#[async_trait]
impl MemoryApi for FakeApi {
    async fn list_memories(
        &self,
        _api_key: &str,
        _user_id: &str,
        _agent_id: &str,
    ) -> memory::Result<MemoryLists> {
        self.record_call(Call::List);
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        // Read the script after the gate so tests can change it while a call is held.
        if let Some(status) = *self.list_failure.lock().unwrap() {
            return Err(status_error(status));
        }
        Ok(self.lists.lock().unwrap().clone())
    }

    async fn add_memory(
        &self,
        _api_key: &str,
        owner: OwnerSelector,
        owner_id: &str,
        text: &str,
    ) -> memory::Result<()> {
        self.record_call(Call::Add {
            owner,
            owner_id: owner_id.to_string(),
            text: text.to_string(),
        });
        if let Some(gate) = &self.add_gate {
            gate.notified().await;
        }
        match self.add_failure {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    async fn search_memories(
        &self,
        _api_key: &str,
        owner: OwnerSelector,
        _user_id: &str,
        _agent_id: &str,
        query: &str,
    ) -> memory::Result<Vec<MemoryRecord>> {
        self.record_call(Call::Search {
            owner,
            query: query.to_string(),
        });
        Ok(self.search_results.clone())
    }
}

pub fn record(memory: &str) -> MemoryRecord {
    MemoryRecord {
        memory: memory.to_string(),
        ..MemoryRecord::default()
    }
}

/// In-memory settings with a complete set of credentials.
pub fn ready_settings() -> SettingsStore {
    let store = SettingsStore::in_memory(DefaultsConfig::default());
    store.save(SettingsField::ApiKey, "k").unwrap();
    store
}

/// In-memory settings without an API key.
pub fn empty_settings() -> SettingsStore {
    SettingsStore::in_memory(DefaultsConfig::default())
}
