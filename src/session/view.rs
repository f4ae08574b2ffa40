//! What the playground page shows for a given session state.

use crate::memory::{MemoryRecord, OwnerSelector};

use super::state::{SessionState, Tab, VisualizationData};

/// Render-ready projection of [`SessionState`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundView {
    pub api_key: String,
    pub active_tab: Tab,
    pub owner: OwnerSelector,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Id input on the add tab, bound to the selected owner.
    pub owner_id: String,
    pub memory_input: String,
    pub query_input: String,
    pub add_button_label: &'static str,
    pub browser_title: String,
    pub browser_memories: Vec<MemoryRecord>,
    pub browser_empty_message: String,
    pub search_results: Vec<MemoryRecord>,
    pub visualization: Option<VisualizationData>,
}

impl PlaygroundView {
    pub fn derive(state: &SessionState) -> Self {
        let owner = state.owner;
        Self {
            api_key: state.credentials.api_key.clone(),
            active_tab: state.active_tab,
            owner,
            is_loading: state.fetch.is_loading,
            error: state.fetch.error.clone(),
            owner_id: state.owner_id().to_string(),
            memory_input: state.memory_input.clone(),
            query_input: state.query_input.clone(),
            add_button_label: if state.fetch.is_loading {
                "Adding..."
            } else {
                "Add Memory"
            },
            browser_title: format!("Recent {} Memories", owner.label()),
            browser_memories: state.owner_memories().to_vec(),
            browser_empty_message: format!("No {} memories found.", owner.as_str()),
            search_results: state.search_results.clone(),
            visualization: state.visualization,
        }
    }
}
