//! `GET /catalog` (spec.md §4.C, §4.I): search over the catalog with
//! `q`/`type`/`domain` filters and `page`/`pageSize` pagination.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::catalog::SearchQuery;

#[derive(Debug, Deserialize, Default)]
pub struct CatalogQueryParams {
    pub q: Option<String>,
    pub r#type: Option<String>,
    pub domain: Option<String>,
    #[serde(default, rename = "page")]
    pub page: Option<usize>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<usize>,
}

pub async fn search(
    Query(params): Query<CatalogQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let query = SearchQuery {
        q: params.q,
        r#type: params.r#type,
        domain: params.domain,
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(0),
    };
    let result = state.catalog.search(query).await?;

    Ok(Json(json!({
        "@context": crate::ld::CANONICAL_CONTEXT_URL,
        "id": crate::catalog::BASE_URL.to_string() + "/catalog",
        "type": "hydra:Collection",
        "totalItems": result.total_items,
        "member": result.items,
        "first": result.first,
        "previous": result.previous,
        "next": result.next,
        "last": result.last,
    })))
}
