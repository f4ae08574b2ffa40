//! The swappable `#playground` section: tabs, forms and memory lists.

use std::fmt::Write as _;

use super::escape;
use crate::memory::{MemoryRecord, OwnerSelector};
use crate::session::{PlaygroundView, Tab, VisualizationData};

/// Render the section for `view`.
pub fn section(session_id: &str, view: &PlaygroundView) -> String {
    let base = format!("/playground/{session_id}");
    let error = view
        .error
        .as_deref()
        .map(|e| {
            format!(
                r#"<div class="bg-red-600/20 border border-red-600 p-3 rounded-md mb-4" role="alert"><p class="font-medium">Error: {}</p></div>"#,
                escape(e)
            )
        })
        .unwrap_or_default();
    let tabs = tab_bar(&base, view.active_tab);
    let body = match view.active_tab {
        Tab::Add => add_tab(&base, view),
        Tab::Search => search_tab(&base, view),
        Tab::Visualize => visualize_tab(&base, view),
    };
    let browser = memory_browser(&base, view);
    let loading = if view.is_loading { "true" } else { "false" };

    format!(
        r#"<section id="playground" data-loading="{loading}">
    {error}
    <div class="flex mb-6 border-b border-gray-700">{tabs}</div>
    <div class="grid grid-cols-1 md:grid-cols-5 gap-6">
        <div class="md:col-span-3 border-2 border-gray-800 rounded-lg p-4">{body}</div>
        <div class="md:col-span-2 border-2 border-gray-800 rounded-lg p-4">{browser}</div>
    </div>
</section>"#
    )
}

fn tab_bar(base: &str, active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            let class = if *tab == active {
                "text-blue-500 border-b-2 border-blue-500"
            } else {
                "text-gray-400 hover:text-white"
            };
            format!(
                r#"<button class="px-4 py-2 font-medium {class}" hx-post="{base}/tab" hx-vals='{{"tab": "{tab}"}}'>{label}</button>"#,
                label = tab.label()
            )
        })
        .collect()
}

fn owner_buttons(base: &str, active: OwnerSelector, prefix: &str) -> String {
    [OwnerSelector::User, OwnerSelector::Agent]
        .iter()
        .map(|owner| {
            let class = if *owner == active {
                "bg-blue-600"
            } else {
                "bg-gray-700"
            };
            let label = if prefix.is_empty() {
                format!("{} Memory", owner.label())
            } else {
                format!("{prefix} {}", owner.label())
            };
            format!(
                r#"<button class="w-1/2 {class}" hx-post="{base}/owner" hx-vals='{{"owner": "{owner}"}}'>{label}</button>"#
            )
        })
        .collect()
}

fn add_tab(base: &str, view: &PlaygroundView) -> String {
    let owners = owner_buttons(base, view.owner, "");
    let label = view.owner.label();
    let field = match view.owner {
        OwnerSelector::User => "user_id",
        OwnerSelector::Agent => "agent_id",
    };
    let owner_id = escape(&view.owner_id);
    let memory = escape(&view.memory_input);
    let disabled = if view.is_loading { " disabled" } else { "" };
    let button = view.add_button_label;

    format!(
        r#"<div class="space-y-4">
    <div class="flex space-x-2">{owners}</div>
    <div>
        <label class="text-sm text-gray-400">{label} ID</label>
        <input name="value" value="{owner_id}" placeholder="Enter {owner} ID"
            hx-post="{base}/settings" hx-trigger="change" hx-vals='{{"field": "{field}"}}'>
    </div>
    <form hx-post="{base}/memories">
        <label class="text-sm text-gray-400">Memory Content</label>
        <textarea name="memory" class="h-24" placeholder="Enter memory content..."
            hx-post="{base}/memories" hx-trigger="keydown[key=='Enter']"
            hx-vals='{{"key": "Enter"}}'>{memory}</textarea>
        <button type="submit" class="w-full bg-amber-600"{disabled}>{button}</button>
    </form>
</div>"#,
        owner = view.owner.as_str()
    )
}

fn search_tab(base: &str, view: &PlaygroundView) -> String {
    let owners = owner_buttons(base, view.owner, "Search");
    let query = escape(&view.query_input);
    let disabled = if view.is_loading { " disabled" } else { "" };
    let results: String = if view.is_loading {
        r#"<p class="text-center py-10">Searching memories...</p>"#.to_string()
    } else if view.search_results.is_empty() {
        r#"<p class="text-center py-10 text-gray-400">No results found. Try a different search query.</p>"#
            .to_string()
    } else {
        view.search_results.iter().map(memory_card).collect()
    };

    format!(
        r#"<div class="space-y-4">
    <div class="flex space-x-2">{owners}</div>
    <form hx-post="{base}/search">
        <label class="text-sm text-gray-400">Search Query</label>
        <div class="flex space-x-2">
            <input name="query" value="{query}" placeholder="Enter search query..."
                hx-post="{base}/search" hx-trigger="keydown[key=='Enter']"
                hx-vals='{{"key": "Enter"}}'>
            <button type="submit" class="bg-amber-600"{disabled}>Search</button>
        </div>
    </form>
    <div>
        <h3 class="text-md font-semibold mb-2">Search Results</h3>
        <div class="h-64 overflow-y-auto border border-gray-700 rounded-lg p-2">{results}</div>
    </div>
</div>"#
    )
}

fn visualize_tab(base: &str, view: &PlaygroundView) -> String {
    let disabled = if view.is_loading { " disabled" } else { "" };
    let body = match view.visualization {
        Some(data) => {
            let user_bar = VisualizationData::bar_height(data.user_count);
            let agent_bar = VisualizationData::bar_height(data.agent_count);
            format!(
                r#"<div class="bg-gray-800 p-6 rounded-lg">
        <h4 class="text-center mb-6 font-medium">Memory Distribution</h4>
        <div class="flex justify-center space-x-8">
            <div class="text-center">
                <div style="width: 100px; height: {user_bar}px; background-color: rgba(59, 130, 246, 0.8)"></div>
                <p class="font-medium">User</p><p class="text-2xl font-bold" data-count="user">{user}</p>
            </div>
            <div class="text-center">
                <div style="width: 100px; height: {agent_bar}px; background-color: rgba(217, 119, 6, 0.8)"></div>
                <p class="font-medium">Agent</p><p class="text-2xl font-bold" data-count="agent">{agent}</p>
            </div>
        </div>
        <h4 class="text-md font-medium mt-8 mb-3">Memory Stats</h4>
        <div class="grid grid-cols-2 gap-4">
            <div><p class="text-sm text-gray-400">Total Memories</p><p class="text-xl font-bold">{total}</p></div>
            <div><p class="text-sm text-gray-400">Memory Ratio</p><p class="text-xl font-bold">{ratio}</p></div>
        </div>
    </div>"#,
                user = data.user_count,
                agent = data.agent_count,
                total = data.total(),
                ratio = data.ratio(),
            )
        }
        None => r#"<div class="text-center py-10"><p class="text-gray-400">No visualization data available. Refresh to load data.</p></div>"#
            .to_string(),
    };

    format!(
        r#"<div class="space-y-4">
    <div class="flex justify-between mb-4">
        <h3 class="text-lg font-semibold">Memory Visualization</h3>
        <button hx-post="{base}/connect"{disabled}>Refresh</button>
    </div>
    {body}
</div>"#
    )
}

fn memory_browser(base: &str, view: &PlaygroundView) -> String {
    let title = escape(&view.browser_title);
    let mut toggles = String::new();
    for owner in [OwnerSelector::User, OwnerSelector::Agent] {
        let class = if owner == view.owner { "bg-blue-900/30" } else { "" };
        let _ = write!(
            toggles,
            r#"<button class="{class}" hx-post="{base}/owner" hx-vals='{{"owner": "{owner}"}}'>{label}</button>"#,
            label = owner.label()
        );
    }

    let list: String = if view.is_loading {
        r#"<p class="text-center py-10">Loading memories...</p>"#.to_string()
    } else if view.browser_memories.is_empty() {
        format!(
            r#"<p class="text-center py-10 text-gray-400">{}</p>"#,
            escape(&view.browser_empty_message)
        )
    } else {
        view.browser_memories.iter().map(memory_card).collect()
    };

    format!(
        r#"<div class="flex justify-between items-center mb-4">
    <h3 class="text-lg font-semibold">{title}</h3>
    <div class="flex">{toggles}</div>
</div>
<div class="overflow-y-auto">{list}</div>"#
    )
}

fn memory_card(memory: &MemoryRecord) -> String {
    format!(
        r#"<div class="memory-card bg-gray-800 rounded-lg p-3 mb-3 border border-gray-700">
    <div class="text-xs text-gray-400 mb-1 flex justify-between"><span>ID: {id}</span><span>{time}</span></div>
    <p>{text}</p>
</div>"#,
        id = escape(&memory.short_id()),
        time = memory.display_time(),
        text = escape(&memory.memory),
    )
}
