use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scarer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub url: String,
}

/// Scarers plus a version bumped on every write; the version doubles as the ETag.
#[derive(Debug, Default)]
pub struct Store {
    pub scarers: Vec<Scarer>,
    pub version: u64,
}

impl Store {
    fn etag(&self) -> String {
        format!("\"v{}\"", self.version)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

pub fn app_with(scarers: Vec<Scarer>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store { scarers, version: 1 }));
    Router::new()
        .route("/scarers", get(list_scarers).post(create_scarer))
        .route("/scarers/{name}", get(get_scarer).delete(delete_scarer))
        .route("/teapot", get(teapot))
        .with_state(db)
}

/// A few scarers to serve when running the binary.
pub fn sample_scarers() -> Vec<Scarer> {
    vec![
        Scarer {
            name: "James P. Sullivan".to_string(),
            nickname: Some("Sulley".to_string()),
            url: "https://scarers.test/img/sulley.jpg".to_string(),
        },
        Scarer {
            name: "Mike Wazowski".to_string(),
            nickname: None,
            url: "https://scarers.test/img/mike.jpg".to_string(),
        },
    ]
}

pub async fn run(listener: TcpListener, scarers: Vec<Scarer>) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, scarers = scarers.len(), "mock server listening");
    }
    axum::serve(listener, app_with(scarers)).await
}

async fn list_scarers(State(db): State<Db>, headers: HeaderMap) -> Response {
    let store = db.read().await;
    let etag = store.etag();
    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == etag);

    if not_modified {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }
    (StatusCode::OK, [(header::ETAG, etag)], Json(store.scarers.clone())).into_response()
}

async fn create_scarer(State(db): State<Db>, Json(input): Json<Scarer>) -> Result<(StatusCode, Json<Scarer>), StatusCode> {
    let mut store = db.write().await;
    if store.scarers.iter().any(|s| s.name == input.name) {
        return Err(StatusCode::CONFLICT);
    }
    store.scarers.push(input.clone());
    store.version += 1;
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_scarer(State(db): State<Db>, Path(name): Path<String>) -> Result<Json<Scarer>, StatusCode> {
    let store = db.read().await;
    store
        .scarers
        .iter()
        .find(|s| s.name == name)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_scarer(State(db): State<Db>, Path(name): Path<String>) -> StatusCode {
    let mut store = db.write().await;
    let before = store.scarers.len();
    store.scarers.retain(|s| s.name != name);
    if store.scarers.len() == before {
        return StatusCode::NOT_FOUND;
    }
    store.version += 1;
    StatusCode::NO_CONTENT
}

async fn teapot() -> (StatusCode, &'static str) {
    (StatusCode::IM_A_TEAPOT, "short and stout")
}
