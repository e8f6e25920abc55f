//! `GET /prompts` (spec.md §4.I): the collection of seed prompts an agent
//! can be started from.

use axum::Json;
use axum::extract::State;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::catalog::seed;
use crate::ld::Resource;

pub async fn get(State(state): State<AppState>) -> Result<Json<Resource>, ApiError> {
    let resource = state
        .store
        .get(seed::PROMPTS_ID)
        .await?
        .ok_or_else(|| ApiError::NotFound("prompts collection not seeded".into()))?;
    Ok(Json(resource))
}
