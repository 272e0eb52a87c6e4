//! In-process GitLab API stand-in for backend integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{delete, get, post};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use serde_json::{Value, json};

pub type Shared = Arc<Mutex<ServerState>>;

/// Mutable state behind the mock API.
#[derive(Default)]
pub struct ServerState {
    /// Raw file contents by repository path.
    pub files: HashMap<String, Vec<u8>>,
    /// Tree listing pages by folder. Each inner vec is one page.
    pub tree_pages: HashMap<String, Vec<Vec<Value>>>,
    /// Access level reported for the project.
    pub access_level: u32,
    /// Number of raw-content requests served.
    pub raw_hits: usize,
    /// Number of tree-listing requests served.
    pub tree_hits: usize,
    /// Number of file-deletion requests served.
    pub delete_hits: usize,
    /// The Authorization header seen on the last /user request.
    pub last_auth: Option<String>,
    /// The body of the last commit request.
    pub last_commit: Option<Value>,
}

impl ServerState {
    pub fn with_access_level(access_level: u32) -> Self {
        Self {
            access_level,
            ..Self::default()
        }
    }

    /// Registers one single-page folder listing of blob entries.
    pub fn add_tree_page(&mut self, folder: &str, entries: Vec<Value>) {
        self.tree_pages
            .entry(folder.to_string())
            .or_default()
            .push(entries);
    }

    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), content.into());
    }
}

/// Helper to build one blob node of a tree listing.
pub fn blob_node(id: &str, path: &str) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({"id": id, "name": name, "type": "blob", "path": path})
}

/// Helper to build one tree (directory) node.
pub fn tree_node(id: &str, path: &str) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({"id": id, "name": name, "type": "tree", "path": path})
}

/// The running mock server.
pub struct MockGitLab {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockGitLab {
    /// Binds an ephemeral port and serves the mock API on it.
    pub async fn start(state: ServerState) -> Self {
        let shared: Shared = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/user", get(user))
            .route("/projects/{project}", get(project))
            .route("/projects/{project}/repository/tree", get(tree))
            .route(
                "/projects/{project}/repository/files/{file_path}/raw",
                get(raw_file),
            )
            .route(
                "/projects/{project}/repository/files/{file_path}",
                delete(delete_file),
            )
            .route("/projects/{project}/repository/commits", post(commits))
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock API");
        });

        Self {
            addr,
            state: shared,
        }
    }

    pub fn api_root(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn raw_hits(&self) -> usize {
        self.state.lock().raw_hits
    }
}

async fn user(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().last_auth = auth;

    Json(json!({"id": 1, "name": "Test User", "username": "test"}))
}

async fn project(State(state): State<Shared>) -> Json<Value> {
    let access_level = state.lock().access_level;
    Json(json!({
        "permissions": {
            "project_access": {"access_level": access_level},
            "group_access": null,
        }
    }))
}

async fn tree(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let folder = params.get("path").cloned().unwrap_or_default();
    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    let mut state = state.lock();
    state.tree_hits += 1;

    let pages = state.tree_pages.get(&folder).cloned().unwrap_or_default();
    let entries = pages.get(page - 1).cloned().unwrap_or_default();
    let next_page = if page < pages.len() {
        (page + 1).to_string()
    } else {
        String::new()
    };

    ([("X-Next-Page", next_page)], Json(Value::Array(entries)))
}

async fn raw_file(
    State(state): State<Shared>,
    Path((_project, file_path)): Path<(String, String)>,
) -> impl IntoResponse {
    let mut state = state.lock();
    state.raw_hits += 1;

    match state.files.get(&file_path) {
        Some(content) => (StatusCode::OK, content.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "404 File Not Found"})),
        )
            .into_response(),
    }
}

async fn delete_file(
    State(state): State<Shared>,
    Path((_project, file_path)): Path<(String, String)>,
) -> StatusCode {
    let mut state = state.lock();
    state.delete_hits += 1;

    if state.files.remove(&file_path).is_some() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn commits(State(state): State<Shared>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut state = state.lock();
    state.last_commit = Some(body.clone());

    let actions = body["actions"].as_array().cloned().unwrap_or_default();
    for action in &actions {
        let path = action["file_path"].as_str().unwrap_or_default().to_string();
        let content = action["content"].as_str().unwrap_or_default();
        match action["action"].as_str() {
            Some("create") | Some("update") => {
                let decoded = STANDARD.decode(content).expect("valid base64 content");
                state.files.insert(path, decoded);
            }
            Some("delete") => {
                state.files.remove(&path);
            }
            _ => {}
        }
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "id": "0b4bc9a49b562e85de7cc9e834518ea6828729b9",
            "short_id": "0b4bc9a4",
            "message": body["commit_message"].clone(),
        })),
    )
}
