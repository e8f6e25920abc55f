//! `GET /` (spec.md §4.I): the root API document a client lands on after
//! following the service description's entry point.

use axum::Json;
use axum::extract::State;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::catalog::seed;
use crate::ld::Resource;

pub async fn get(State(state): State<AppState>) -> Result<Json<Resource>, ApiError> {
    let resource = state
        .store
        .get(seed::ROOT_ID)
        .await?
        .ok_or_else(|| ApiError::NotFound("root document not seeded".into()))?;
    Ok(Json(resource))
}
