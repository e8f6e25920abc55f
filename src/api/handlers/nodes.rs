//! `/nodes/*` (spec.md §4.B, §4.C, §4.I): dereferences any resource by
//! its id's path suffix under the gateway's fixed domain, and registers
//! new resources into the mesh.

use axum::Json;
use axum::extract::{Path, State};

use crate::api::error::ApiError;
use crate::catalog::BASE_URL;
use crate::ld::Resource;
use crate::ld::validate;

use crate::api::state::AppState;

pub async fn get(Path(path): Path<String>, State(state): State<AppState>) -> Result<Json<Resource>, ApiError> {
    let id = format!("{BASE_URL}/nodes/{path}");
    let resource = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no resource at {id}")))?;
    Ok(Json(resource))
}

pub async fn register(State(state): State<AppState>, Json(resource): Json<Resource>) -> Result<Json<Resource>, ApiError> {
    let outcome = validate::validate_resource(&resource);
    if !outcome.is_valid() {
        return Err(ApiError::InvalidRequest(
            outcome.errors.into_iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "),
        ));
    }
    let registered = state.catalog.register(resource).await?;
    Ok(Json(registered))
}
