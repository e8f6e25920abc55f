//! Authentication extractor (spec.md §4.I "Auth precedence"): Bearer
//! session token, then a `DID-Auth` scheme on the same `Authorization`
//! header verified against a live challenge (spec.md §4.D), then a bare
//! `X-Agent-DID` fallback for agents that haven't completed a challenge
//! round yet. Grounded in the teacher's `AuthUser` extractor
//! (`examples/omo-protocol-defi-flow/src/api/middleware.rs`), widened from
//! a single JWT-only path to the three-way precedence spec.md requires.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::state::AppState;

pub struct AuthUser {
    pub did: String,
    pub scope: String,
}

/// Parses `<did>;sig=<sig>;nonce=<nonce>` (the part of the `DID-Auth`
/// scheme following the scheme name, spec.md §4.I/§4.D) into its three
/// components. Order of the `sig`/`nonce` parameters is not significant.
fn parse_did_auth(rest: &str) -> Option<(&str, &str, &str)> {
    let mut parts = rest.split(';');
    let did = parts.next()?.trim();
    let mut sig = None;
    let mut nonce = None;
    for param in parts {
        let (key, value) = param.trim().split_once('=')?;
        match key.trim() {
            "sig" => sig = Some(value.trim()),
            "nonce" => nonce = Some(value.trim()),
            _ => {}
        }
    }
    Some((did, sig?, nonce?))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            if let Some(rest) = header.strip_prefix("Bearer ") {
                let claims = state
                    .identity
                    .verify_token(rest)
                    .ok_or_else(|| ApiError::AuthenticationFailed("invalid or expired token".into()))?;
                return Ok(AuthUser {
                    did: claims.sub,
                    scope: claims.scope,
                });
            }

            if let Some(rest) = header.strip_prefix("DID-Auth ") {
                let (did, sig, nonce) = parse_did_auth(rest)
                    .ok_or_else(|| ApiError::AuthenticationRequired("malformed DID-Auth header".into()))?;
                state.identity.verify_challenge(did, sig, nonce)?;
                return Ok(AuthUser {
                    did: did.to_string(),
                    scope: "limited".to_string(),
                });
            }

            return Err(ApiError::AuthenticationRequired("malformed Authorization header".into()));
        }

        if let Some(did) = parts.headers.get("x-agent-did").and_then(|v| v.to_str().ok()) {
            return Ok(AuthUser {
                did: did.to_string(),
                scope: "agent".to_string(),
            });
        }

        Err(ApiError::AuthenticationRequired(
            "no Authorization or X-Agent-DID header present".into(),
        ))
    }
}

/// Same precedence as [`AuthUser`], but missing credentials resolve to
/// `None` rather than rejecting — for routes where auth only changes the
/// response rather than gating it (spec.md §4.I `/operations/lrs/export`).
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}
