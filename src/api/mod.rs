//! The HTTP surface (spec.md §4.I): routing, content negotiation, auth
//! precedence, rate limiting, link headers, and the error envelope.
//! Grounded in the teacher's `src/api/mod.rs` `serve()` shape
//! (`examples/omo-protocol-defi-flow/src/api/mod.rs`): one `Router`
//! assembled from handler modules, CORS applied as a tower layer, bound
//! with a plain `TcpListener` + `axum::serve`.

pub mod error;
pub mod handlers;
pub mod links;
pub mod middleware;
pub mod negotiate;
pub mod rate_limit;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::catalog::CatalogService;
use crate::config::GatewayConfig;
use crate::store::{FileStore, MemoryStore, ResourceStore};

use error::ApiError;
use state::AppState;

/// The version every success response reports via `X-HyprCAT-Version`
/// (spec.md §4.I, pinned by §6).
const PROTOCOL_VERSION: &str = "1.0.0";

/// Content negotiation, rate limiting, and the headers every response
/// carries regardless of route (spec.md §4.I "on every response"),
/// composed as one explicit pipeline rather than ad hoc per-handler calls
/// (spec.md §9's "decorator chains → explicit pipeline" translation
/// note).
async fn cross_cutting(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Err(err) = negotiate::negotiate(request.headers()) {
        return err.into_response();
    }

    let key = request
        .headers()
        .get("x-agent-did")
        .or_else(|| request.headers().get(axum::http::header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "anonymous".to_string());

    if let Err(retry_after) = state.rate_limiter.check(&key).await {
        return ApiError::RateLimited { retry_after }.into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static(negotiate::CONTENT_TYPE),
    );
    headers.insert("x-hyprcat-version", HeaderValue::from_static(PROTOCOL_VERSION));
    if let Ok(value) = links::standard_link_header(&state.config.base_url).parse() {
        headers.insert(axum::http::header::LINK, value);
    }
    if state.config.enable_security_headers {
        headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    }
    response
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/stats", get(handlers::health::stats))
        .route("/.well-known/{scheme}", get(handlers::wellknown::get))
        .route("/", get(handlers::root::get))
        .route("/catalog", get(handlers::catalog::search))
        .route("/prompts", get(handlers::prompts::get))
        .route("/nodes", post(handlers::nodes::register))
        .route("/nodes/{*path}", get(handlers::nodes::get))
        .route("/operations/checkout", post(handlers::checkout::checkout))
        .route("/operations/query", post(handlers::query::run))
        .route("/operations/lrs/export", get(handlers::lrs::export))
        .route("/operations/token/mint", post(handlers::token::mint))
        .route("/operations/token/burn", delete(handlers::token::burn))
        .route("/auth/challenge", post(handlers::auth::challenge))
        .route("/auth/verify", post(handlers::auth::verify))
        .route("/auth/profile", get(handlers::auth::profile))
        .route("/wallet", get(handlers::wallet::get))
        .layer(from_fn_with_state(state.clone(), cross_cutting))
        .layer(cors)
        .with_state(state)
}

/// Builds the store backend named by `config.storage_backend`, seeds the
/// demonstration mesh, and serves the HTTP surface (spec.md §4.I, §6
/// "environment config").
pub async fn serve(config: GatewayConfig) -> Result<()> {
    let config = Arc::new(config);
    let store: Arc<dyn ResourceStore> = match config.storage_backend {
        crate::config::StorageBackend::Memory => Arc::new(MemoryStore::new()),
        crate::config::StorageBackend::File => Arc::new(FileStore::new(&config.storage_dir)),
    };

    let catalog = CatalogService::new(store.clone());
    catalog.seed().await.context("seeding demonstration mesh")?;

    let state = AppState::new(config.clone(), store);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(addr, "hyprcat gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    axum::serve(listener, app).await.context("running gateway")?;
    Ok(())
}

/// Builds the router without binding a socket, for in-process testing
/// (`tower::ServiceExt::oneshot`) against a caller-assembled `AppState`.
pub fn test_router(state: AppState) -> Router {
    build_router(state)
}
