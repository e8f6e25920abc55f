//! `POST /operations/query` (spec.md §4.G, §8 scenario 4): runs the
//! federated query dialect against the simulated backing sources and
//! returns a `czero:ResultSet`-typed envelope.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::middleware::OptionalAuthUser;
use crate::api::state::AppState;
use crate::federation::{self, FederationError};

/// Attribution used for a query chain when the caller presented no
/// credentials — `/operations/query` is unauthenticated (spec.md §6 route
/// table), but every handler that attributes still records an activity
/// (spec.md §4.I), so anonymous callers get a shared, unowned chain.
const ANONYMOUS_DID: &str = "anonymous";

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(alias = "schema:query")]
    pub query: String,
}

pub async fn run(
    OptionalAuthUser(auth): OptionalAuthUser,
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::ValidationError(vec!["query must not be empty".into()]));
    }
    let agent_did = auth.map(|a| a.did).unwrap_or_else(|| ANONYMOUS_DID.to_string());

    let started = Instant::now();
    let response = federation::execute(&req.query).map_err(|e| match e {
        // A malformed query is a caller mistake (spec.md §7 `ValidationError`);
        // a planning failure means every named source was unresolvable even
        // after the default fallback, which is this engine's own fault.
        FederationError::Parse(_) => ApiError::ValidationError(vec![e.to_string()]),
        FederationError::Plan(_) => ApiError::FederationError(e.to_string()),
    })?;
    let execution_time = format!("{}ms", started.elapsed().as_millis());

    let chain_id = state
        .provenance
        .start_chain(&agent_did, "query", json!({ "query": req.query }));
    let activity_id = state
        .provenance
        .with_chain_mut(&agent_did, &chain_id, |chain| {
            chain.append_activity(
                "federated-query",
                "QueryAction",
                Some(json!({ "query": req.query })),
                None,
                Some("POST".to_string()),
                Some("/operations/query".to_string()),
                Some(200),
                Some(started.elapsed().as_secs_f64() * 1000.0),
            )
        })
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::Internal("failed to record query activity".into()))?;

    let items: Vec<&Value> = response.rows.iter().map(|r| &r.row).collect();
    Ok(Json(json!({
        "@context": crate::ld::CANONICAL_CONTEXT_URL,
        "type": "czero:ResultSet",
        "items": items,
        "sources": response.sources_queried,
        "totalResults": response.total_results,
        "queryLanguage": response.query_language,
        "executionTime": execution_time,
        "wasGeneratedBy": activity_id,
    })))
}
