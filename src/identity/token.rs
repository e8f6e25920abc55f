//! Self-verifying session tokens (spec.md §3, §4.D), grounded almost
//! directly on the teacher's `src/api/auth.rs` JWT helpers
//! (`create_jwt`/`verify_jwt` via `jsonwebtoken`), generalized from a bare
//! `user_id` claim to `{did, scope}`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // did
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct SessionToken {
    pub token: String,
    pub did: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub scope: String,
}

/// `issueToken` (spec.md §4.D): `{did, issuedAt, expiresAt=now+1h, scope}`
/// signed with a process-scoped HMAC secret.
pub fn issue(did: &str, scope: &str, secret: &str) -> Result<SessionToken, TokenError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(TOKEN_TTL_SECS);
    let claims = Claims {
        sub: did.to_string(),
        scope: scope.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(SessionToken {
        token,
        did: did.to_string(),
        issued_at: claims.iat,
        expires_at: claims.exp,
        scope: scope.to_string(),
    })
}

/// `verifyToken` (spec.md §4.D): recomputes the tag and enforces expiry.
/// `jsonwebtoken`'s HMAC comparison is constant-time internally, which is
/// what spec.md §8's timing-safety invariant requires.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let issued = issue("did:pkh:eip155:1:0xabc", "full", "secret").unwrap();
        let claims = verify(&issued.token, "secret").unwrap();
        assert_eq!(claims.sub, "did:pkh:eip155:1:0xabc");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issued = issue("did:pkh:eip155:1:0xabc", "full", "secret").unwrap();
        assert!(verify(&issued.token, "other-secret").is_err());
    }
}
