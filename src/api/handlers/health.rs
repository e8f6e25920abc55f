//! `/health`, `/ready`, `/stats` (spec.md §4.I): liveness, readiness, and a
//! small set of process counters useful for smoke-testing a deployment.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::api::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn ready(State(state): State<AppState>) -> Json<Value> {
    let ready = state.store.list().await.is_ok();
    Json(json!({ "ready": ready }))
}

pub async fn stats(State(state): State<AppState>) -> Json<Value> {
    let resource_count = state.store.list().await.map(|ids| ids.len()).unwrap_or(0);
    Json(json!({
        "resources": resource_count,
        "storageBackend": format!("{:?}", state.config.storage_backend),
    }))
}
