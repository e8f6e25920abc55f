//! `GET /.well-known/:scheme` (spec.md §4.I): the service description, the
//! entry point for client discovery (spec.md §4.J `discover`).

use axum::Json;
use axum::extract::{Path, State};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::catalog::seed;
use crate::ld::Resource;

pub async fn get(Path(scheme): Path<String>, State(state): State<AppState>) -> Result<Json<Resource>, ApiError> {
    if scheme != "hyprcat" {
        return Err(ApiError::NotFound(format!("unknown well-known scheme {scheme:?}")));
    }
    let resource = state
        .store
        .get(seed::SERVICE_DESCRIPTION_ID)
        .await?
        .ok_or_else(|| ApiError::NotFound("service description not seeded".into()))?;
    Ok(Json(resource))
}
