//! In-process stand-in for the remote memory API.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use memory_playground::memory::MemoryClient;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A request seen by the stub server.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: &'static str,
    pub auth: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
    fail_agent_list: Arc<AtomicBool>,
    search_body: Arc<Mutex<Value>>,
}

impl Stub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_body(self, body: Value) -> Self {
        *self.search_body.lock().unwrap() = body;
        self
    }

    /// Make the agent half of a list answer 500.
    pub fn fail_agent_list(&self, fail: bool) {
        self.fail_agent_list.store(fail, Ordering::SeqCst);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn push(
        &self,
        path: &'static str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        body: Option<Value>,
    ) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            path,
            auth,
            query,
            body,
        });
    }

    /// Serve on an ephemeral port and return a client pointed at it.
    pub async fn spawn(&self) -> MemoryClient {
        let app = Router::new()
            .route("/api/get", get(list_handler))
            .route("/api/add", post(add_handler))
            .route("/api/search", post(search_handler))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MemoryClient::new(format!("http://{addr}")).unwrap()
    }
}

async fn list_handler(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    stub.push("/api/get", &headers, query.clone(), None);
    if query.contains_key("agent_id") {
        if stub.fail_agent_list.load(Ordering::SeqCst) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "agent store down").into_response();
        }
        return Json(json!({})).into_response();
    }
    Json(json!({"results": [{"id": "abc123456789", "memory": "x"}]})).into_response()
}

async fn add_handler(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.push("/api/add", &headers, HashMap::new(), Some(body));
    Json(json!({"status": "queued"})).into_response()
}

async fn search_handler(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.push("/api/search", &headers, HashMap::new(), Some(body));
    let body = stub.search_body.lock().unwrap().clone();
    Json(body).into_response()
}
