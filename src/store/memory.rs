//! In-process resource store backed by `dashmap` (spec.md §4.B): mutations
//! are protected so concurrent readers never observe a half-written value.
//! Grounded in the pack's `ferrofluid` sub-crate, which already reaches for
//! `dashmap` over a `RwLock<HashMap>` for its own concurrent tables.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::ld::Resource;

use super::{ResourceStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    resources: DashMap<String, Resource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Resource>, StoreError> {
        Ok(self.resources.get(id).map(|r| r.clone()))
    }

    async fn put(&self, id: &str, resource: Resource) -> Result<(), StoreError> {
        self.resources.insert(id.to_string(), resource);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.resources.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.resources.iter().map(|e| e.key().clone()).collect())
    }

    async fn find_by_type(&self, ty: &str) -> Result<Vec<Resource>, StoreError> {
        Ok(self
            .resources
            .iter()
            .filter(|e| e.value().is_of_type(ty))
            .map(|e| e.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryStore::new();
        let r = Resource::new("https://x/a", vec!["schema:Thing".into()]);
        store.put(&r.id, r.clone()).await.unwrap();
        let got = store.get("https://x/a").await.unwrap().unwrap();
        assert_eq!(got.id, r.id);
    }

    #[tokio::test]
    async fn missing_get_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("https://x/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_type_filters() {
        let store = MemoryStore::new();
        store
            .put(
                "https://x/a",
                Resource::new("https://x/a", vec!["schema:Product".into()]),
            )
            .await
            .unwrap();
        store
            .put(
                "https://x/b",
                Resource::new("https://x/b", vec!["schema:Thing".into()]),
            )
            .await
            .unwrap();
        let products = store.find_by_type("schema:Product").await.unwrap();
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_present() {
        let store = MemoryStore::new();
        store
            .put(
                "https://x/a",
                Resource::new("https://x/a", vec!["schema:Thing".into()]),
            )
            .await
            .unwrap();
        assert!(store.delete("https://x/a").await.unwrap());
        assert!(!store.delete("https://x/a").await.unwrap());
    }
}
