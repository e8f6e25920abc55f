//! In-memory response cache honoring `Cache-Control: max-age` (spec.md
//! §4.J "fetch"). Grounded in the teacher's `src/api/rate_limit.rs` habit
//! of a `Mutex`-guarded map keyed by a caller identity, adapted here to a
//! URL-keyed cache of freshness windows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::ld::Resource;

struct CacheEntry {
    resource: Resource,
    expires_at: Instant,
}

#[derive(Default)]
pub struct NavigatorCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl NavigatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Resource> {
        let entries = self.entries.lock().unwrap();
        entries.get(url).and_then(|e| {
            if e.expires_at > Instant::now() {
                Some(e.resource.clone())
            } else {
                None
            }
        })
    }

    /// Stores a response, keyed by URL, good for `max_age` from now. A
    /// `max_age` of zero stores nothing (spec.md §4.J implies caching is
    /// opt-in via the header).
    pub fn put(&self, url: &str, resource: Resource, max_age: Duration) {
        if max_age.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            url.to_string(),
            CacheEntry {
                resource,
                expires_at: Instant::now() + max_age,
            },
        );
    }
}

/// Parses the `max-age=<seconds>` directive out of a `Cache-Control` header
/// value, if present.
pub fn parse_max_age(header_value: &str) -> Option<Duration> {
    header_value
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|secs| secs.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_max_age_directive() {
        assert_eq!(parse_max_age("public, max-age=60"), Some(Duration::from_secs(60)));
    }

    #[test]
    fn missing_max_age_is_none() {
        assert_eq!(parse_max_age("no-store"), None);
    }

    #[test]
    fn zero_max_age_stores_nothing() {
        let cache = NavigatorCache::new();
        let r = Resource::new("https://x/a", vec!["schema:Thing".into()]);
        cache.put("https://x/a", r, Duration::ZERO);
        assert!(cache.get("https://x/a").is_none());
    }

    #[test]
    fn stored_entry_is_retrievable_before_expiry() {
        let cache = NavigatorCache::new();
        let r = Resource::new("https://x/a", vec!["schema:Thing".into()]);
        cache.put("https://x/a", r, Duration::from_secs(60));
        assert!(cache.get("https://x/a").is_some());
    }
}
