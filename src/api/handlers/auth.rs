//! `/auth/*` (spec.md §4.D, §8 scenario 3): challenge issuance, signature
//! verification and session-token exchange, and the authenticated profile
//! lookup.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    #[serde(default = "default_domain")]
    pub domain: String,
}

fn default_domain() -> String {
    "hyprcat.example".to_string()
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub nonce: String,
    pub domain: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn challenge(State(state): State<AppState>, Json(req): Json<ChallengeRequest>) -> Json<ChallengeResponse> {
    let issued = state.identity.issue_challenge(&req.domain);
    Json(ChallengeResponse {
        nonce: issued.nonce,
        domain: issued.domain,
        expires_at: issued.expires_at,
    })
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub did: String,
    pub signature: String,
    pub nonce: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub token: String,
    pub did: String,
    pub scope: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

/// `POST /auth/verify` (spec.md §8 scenario 3): a nonce is single-use, so
/// replaying the exact same body a second time fails with
/// `AuthenticationFailed` rather than silently reissuing a token.
pub async fn verify(State(state): State<AppState>, Json(req): Json<VerifyRequest>) -> Result<Json<VerifyResponse>, ApiError> {
    state.identity.verify_challenge(&req.did, &req.signature, &req.nonce)?;
    let issued = state.identity.issue_token(&req.did, "full")?;
    state.wallets.ensure(&req.did);

    Ok(Json(VerifyResponse {
        token: issued.token,
        did: issued.did,
        scope: issued.scope,
        expires_at: issued.expires_at,
    }))
}

pub async fn profile(auth: AuthUser) -> Json<Value> {
    Json(json!({
        "did": auth.did,
        "scope": auth.scope,
    }))
}
