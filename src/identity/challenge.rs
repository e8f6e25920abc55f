//! Nonce challenge issuance and one-time consumption (spec.md §4.D, §5).
//! Grounded in the teacher's sliding-window rate limiter
//! (`src/api/rate_limit.rs`) for the "small `DashMap` of short-lived
//! entries, pruned both on lookup and by a background sweep" shape.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;

const CHALLENGE_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct AuthChallenge {
    pub nonce: String,
    pub domain: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthChallenge {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Default)]
pub struct ChallengeStore {
    pending: DashMap<String, AuthChallenge>,
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `issueChallenge` (spec.md §4.D): a cryptographically random nonce of
    /// at least 256 bits, base64url-encoded.
    pub fn issue(&self, domain: &str) -> AuthChallenge {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        use base64::Engine as _;
        let nonce = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);

        let issued_at = Utc::now();
        let challenge = AuthChallenge {
            nonce: nonce.clone(),
            domain: domain.to_string(),
            issued_at,
            expires_at: issued_at + Duration::seconds(CHALLENGE_TTL_SECS),
        };
        self.pending.insert(nonce, challenge.clone());
        challenge
    }

    /// Atomic compare-and-delete: the challenge is removed whether or not
    /// it turns out to be expired, so it can never be consumed twice
    /// (spec.md §4.D, §5).
    pub fn consume(&self, nonce: &str) -> Option<AuthChallenge> {
        self.pending.remove(nonce).map(|(_, v)| v)
    }

    /// Removes entries whose `expiresAt < now`, independent of consumers
    /// (spec.md §5).
    pub fn sweep_expired(&self) {
        self.pending.retain(|_, c| !c.is_expired());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_nonce_is_at_least_256_bits_of_entropy() {
        let store = ChallengeStore::new();
        let c = store.issue("example.com");
        // base64url of 32 bytes is 43 chars (no padding)
        assert_eq!(c.nonce.len(), 43);
    }

    #[test]
    fn consume_is_one_time() {
        let store = ChallengeStore::new();
        let c = store.issue("example.com");
        assert!(store.consume(&c.nonce).is_some());
        assert!(store.consume(&c.nonce).is_none());
    }

    #[test]
    fn sweep_removes_only_expired() {
        let store = ChallengeStore::new();
        let fresh = store.issue("example.com");
        let mut stale = store.issue("example.com");
        stale.expires_at = Utc::now() - Duration::seconds(1);
        store.pending.insert(stale.nonce.clone(), stale.clone());

        store.sweep_expired();
        assert!(store.pending.contains_key(&fresh.nonce));
        assert!(!store.pending.contains_key(&stale.nonce));
    }
}
