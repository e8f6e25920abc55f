//! `GET /operations/lrs/export` (spec.md §4.H "Export", §4.C learning
//! record resource): exports an agent's provenance history in one of two
//! encodings.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::provenance::ExportFormat;

#[derive(Debug, Deserialize, Default)]
pub struct ExportParams {
    pub format: Option<String>,
    #[serde(rename = "chainId")]
    pub chain_id: Option<String>,
}

pub async fn export(
    auth: AuthUser,
    Query(params): Query<ExportParams>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let format = match params.format.as_deref() {
        Some("summary") => ExportFormat::Summary,
        _ => ExportFormat::LinkedData,
    };

    let history = state.provenance.history_of(&auth.did);
    let chain = match &params.chain_id {
        Some(id) => history
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("no chain {id} for this agent")))?,
        None => history
            .into_iter()
            .last()
            .ok_or_else(|| ApiError::NotFound("agent has no provenance history yet".into()))?,
    };

    let body = state.provenance.export_chain(&auth.did, &chain.id, format)?;
    Ok(Json(body))
}
