//! `GET /wallet` (spec.md §4.E, §4.I): the authenticated caller's own
//! wallet snapshot.

use axum::Json;
use axum::extract::State;

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::wallet::WalletState;

pub async fn get(auth: AuthUser, State(state): State<AppState>) -> Result<Json<WalletState>, ApiError> {
    state
        .wallets
        .get(&auth.did)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no wallet for this identity yet".into()))
}
