use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::AppState;
use crate::config::AppConfig;
use crate::memory::{MemoryClient, OwnerSelector};
use crate::session::{KeyTarget, PlaygroundController, SessionStore, Tab};
use crate::settings::{SettingsField, SettingsStore};
use crate::ui;

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let client = MemoryClient::new(&config.remote.base_url)?;
    info!(
        name: "memory.config.loaded",
        base_url = %client.base_url(),
        "Memory API configured"
    );

    let settings = SettingsStore::open(&config.settings.path, config.defaults.clone())?;
    info!(
        name: "settings.loaded",
        path = %config.settings.path,
        "Settings store opened"
    );

    let sessions = SessionStore::new(Arc::new(client), settings);

    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweeper.cleanup_expired();
            if removed > 0 {
                info!(name: "session.expired", removed, "Expired sessions removed");
            }
        }
    });

    let state = AppState {
        sessions,
        config: Arc::clone(&config),
    };

    let app = router(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the playground router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(new_session))
        .route("/playground", get(new_session))
        .route("/health", get(|| async { "ok" }))
        .route("/playground/{id}", get(playground_page))
        .route("/playground/{id}/connect", post(connect))
        .route("/playground/{id}/memories", post(add_memory))
        .route("/playground/{id}/search", post(search_memories))
        .route("/playground/{id}/tab", post(select_tab))
        .route("/playground/{id}/owner", post(select_owner))
        .route("/playground/{id}/settings", post(update_setting))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

type HandlerResult = Result<Response, (StatusCode, String)>;

fn find_session(state: &AppState, id: &str) -> Result<PlaygroundController, (StatusCode, String)> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown session: {id}")))
}

fn fragment(session: &PlaygroundController) -> Response {
    Html(ui::section(session.id(), &session.view())).into_response()
}

/// GET / - Start a session and redirect to it.
async fn new_session(State(state): State<AppState>) -> Redirect {
    let session = state.sessions.create();
    info!(name: "session.created", session_id = %session.id());

    // Initial load runs in the background; a hung remote must not block the page.
    let bootstrap = session.clone();
    tokio::spawn(async move { bootstrap.bootstrap().await });

    Redirect::to(&format!("/playground/{}", session.id()))
}

/// GET /playground/:id - Full page.
async fn playground_page(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let session = find_session(&state, &id)?;
    Ok(Html(ui::page(session.id(), &session.view())).into_response())
}

/// POST /playground/:id/connect - Refresh both memory lists.
async fn connect(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let session = find_session(&state, &id)?;
    session.refresh().await;
    Ok(fragment(&session))
}

#[derive(Debug, Deserialize)]
struct AddForm {
    #[serde(default)]
    memory: String,
    /// Set when the form was submitted from the keyboard.
    #[serde(default)]
    key: Option<String>,
}

/// POST /playground/:id/memories - Add a memory for the selected owner.
async fn add_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AddForm>,
) -> HandlerResult {
    let session = find_session(&state, &id)?;
    session.set_memory_input(form.memory);
    match form.key.as_deref() {
        Some(key) => {
            session.key_press(key, KeyTarget::Add).await;
        }
        None => session.add().await,
    }
    Ok(fragment(&session))
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
    /// Set when the query input sent an Enter key press.
    #[serde(default)]
    key: Option<String>,
}

/// POST /playground/:id/search - Search the selected owner's memories.
async fn search_memories(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SearchForm>,
) -> HandlerResult {
    let session = find_session(&state, &id)?;
    session.set_query_input(form.query);
    match form.key.as_deref() {
        Some(key) => {
            session.key_press(key, KeyTarget::Search).await;
        }
        None => session.search().await,
    }
    Ok(fragment(&session))
}

#[derive(Debug, Deserialize)]
struct TabForm {
    tab: String,
}

/// POST /playground/:id/tab - Switch tabs.
async fn select_tab(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<TabForm>,
) -> HandlerResult {
    let session = find_session(&state, &id)?;
    let tab: Tab = form
        .tab
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    session.select_tab(tab);
    Ok(fragment(&session))
}

#[derive(Debug, Deserialize)]
struct OwnerForm {
    owner: String,
}

/// POST /playground/:id/owner - Switch between user and agent.
async fn select_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<OwnerForm>,
) -> HandlerResult {
    let session = find_session(&state, &id)?;
    let owner: OwnerSelector = form
        .owner
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    session.select_owner(owner);
    Ok(fragment(&session))
}

#[derive(Debug, Deserialize)]
struct SettingsForm {
    field: SettingsField,
    #[serde(default)]
    value: String,
}

/// POST /playground/:id/settings - Edit and persist a credential.
async fn update_setting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SettingsForm>,
) -> HandlerResult {
    let session = find_session(&state, &id)?;
    if form.field == SettingsField::ApiKey && form.value.is_empty() {
        warn!(name: "settings.api_key.cleared", session_id = %id);
    }
    session.set_field(form.field, form.value);
    Ok(fragment(&session))
}
