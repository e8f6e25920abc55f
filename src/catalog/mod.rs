//! Catalog service (spec.md §4.C): seeds the resource store with a small
//! demonstration mesh, and exposes register/search over it. Grounded in
//! `src/api/history.rs`'s deterministic JSON-file listing with a
//! sort-then-paginate shape, adapted here to resource search instead of
//! trade history.

pub mod seed;

use std::sync::Arc;

use thiserror::Error;

use crate::ld::validate::{self, ValidationError};
use crate::ld::Resource;
use crate::store::{ResourceStore, StoreError};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;
/// The fixed domain every seeded resource id lives under (spec.md §4.C);
/// exposed so the HTTP surface can map `/nodes/*` paths to store keys
/// without duplicating the literal.
pub const BASE_URL: &str = "https://hyprcat.example";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, Clone)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub r#type: Option<String>,
    pub domain: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

pub struct SearchResult {
    pub items: Vec<Resource>,
    pub total_items: usize,
    pub first: String,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub last: String,
}

pub struct CatalogService {
    store: Arc<dyn ResourceStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Seeds the store with the deterministic demonstration mesh and wires
    /// every non-collection seed resource into the root catalog's member
    /// list (spec.md §4.C).
    pub async fn seed(&self) -> Result<(), StoreError> {
        let resources = seed::seed_resources();
        let mut catalog_members = Vec::new();
        for resource in resources {
            if resource.id != seed::CATALOG_ID && resource.id != seed::PROMPTS_ID {
                catalog_members.push(resource.clone());
            }
            self.store.put(&resource.id.clone(), resource).await?;
        }
        if let Some(mut catalog) = self.store.get(seed::CATALOG_ID).await? {
            catalog = catalog.with_members(catalog_members);
            self.store.put(seed::CATALOG_ID, catalog).await?;
        }
        Ok(())
    }

    async fn all_resources(&self) -> Result<Vec<Resource>, StoreError> {
        let ids = self.store.list().await?;
        let mut resources = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(r) = self.store.get(&id).await? {
                resources.push(r);
            }
        }
        Ok(resources)
    }

    /// `register(resource)` (spec.md §4.C): validates, stores, and appends
    /// a reference to the root catalog's member list.
    pub async fn register(&self, resource: Resource) -> Result<Resource, CatalogError> {
        let outcome = validate::validate_resource(&resource);
        if !outcome.is_valid() {
            return Err(CatalogError::InvalidRequest(
                outcome.errors.into_iter().next().expect("is_valid checked"),
            ));
        }

        self.store.put(&resource.id.clone(), resource.clone()).await?;

        if let Some(mut catalog) = self.store.get(seed::CATALOG_ID).await? {
            let mut members = catalog.member.take().unwrap_or_default();
            members.push(resource.clone());
            catalog = catalog.with_members(members);
            self.store.put(seed::CATALOG_ID, catalog).await?;
        }

        Ok(resource)
    }

    /// `search(...)` (spec.md §4.C): filters by type/domain/substring query,
    /// orders ascending by id for determinism, and paginates.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult, CatalogError> {
        let mut all = self.all_resources().await?;
        all.retain(|r| r.id != seed::CATALOG_ID);

        if let Some(t) = &query.r#type {
            all.retain(|r| r.is_of_type(t));
        }
        if let Some(domain) = &query.domain {
            all.retain(|r| r.extra.get("hyprcat:domain").and_then(|v| v.as_str()) == Some(domain.as_str()));
        }
        if let Some(q) = &query.q {
            let needle = q.to_lowercase();
            all.retain(|r| {
                let title = r
                    .extra
                    .get("schema:name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_lowercase();
                let description = r
                    .extra
                    .get("schema:description")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_lowercase();
                title.contains(&needle) || description.contains(&needle)
            });
        }

        all.sort_by(|a, b| a.id.cmp(&b.id));

        let total_items = all.len();
        let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE).max(1);
        let page_size = if query.page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        let page = query.page.max(1);
        let last_page = total_items.div_ceil(page_size).max(1);

        let start = (page - 1) * page_size;
        let items: Vec<Resource> = all.into_iter().skip(start).take(page_size).collect();

        let params = |p: usize| format!("{BASE_URL}/catalog?page={p}&pageSize={page_size}");

        Ok(SearchResult {
            items,
            total_items,
            first: params(1),
            previous: (page > 1).then(|| params(page - 1)),
            next: (page < last_page).then(|| params(page + 1)),
            last: params(last_page),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded_catalog() -> CatalogService {
        let store: Arc<dyn ResourceStore> = Arc::new(MemoryStore::new());
        let catalog = CatalogService::new(store);
        catalog.seed().await.unwrap();
        catalog
    }

    #[tokio::test]
    async fn seed_wires_catalog_members() {
        let catalog = seeded_catalog().await;
        let result = catalog.search(SearchQuery::default()).await.unwrap();
        assert!(result.total_items >= 4);
    }

    #[tokio::test]
    async fn search_filters_by_type() {
        let catalog = seeded_catalog().await;
        let result = catalog
            .search(SearchQuery {
                r#type: Some("schema:Product".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_items, 1);
    }

    #[tokio::test]
    async fn search_pagination_emits_next_and_previous() {
        let catalog = seeded_catalog().await;
        let result = catalog
            .search(SearchQuery {
                page: 1,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 2);
        assert!(result.previous.is_none());
        assert!(result.next.is_some());
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let catalog = seeded_catalog().await;
        let bad = Resource::new("", vec![]);
        let err = catalog.register(bad).await;
        assert!(matches!(err, Err(CatalogError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn register_appends_to_catalog() {
        let catalog = seeded_catalog().await;
        let before = catalog.search(SearchQuery::default()).await.unwrap().total_items;
        let resource = Resource::new("https://hyprcat.example/nodes/new", vec!["schema:Thing".into()]);
        catalog.register(resource).await.unwrap();
        let after = catalog.search(SearchQuery::default()).await.unwrap().total_items;
        assert_eq!(after, before + 1);
    }
}
