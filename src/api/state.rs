//! Shared application state (spec.md §4.I), grounded in the teacher's
//! `AppState(Arc<RwLock<Inner>>)` shape
//! (`examples/omo-protocol-defi-flow/src/api/state.rs`), simplified to a
//! flat bag of already-concurrent-safe `Arc` handles: every component
//! underneath (`DashMap`-backed stores and services) already owns its own
//! interior synchronization, so a single outer `RwLock` would only add
//! contention without adding safety.

use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::config::GatewayConfig;
use crate::governance::PaymentService;
use crate::identity::IdentityService;
use crate::provenance::ProvenanceService;
use crate::store::ResourceStore;
use crate::wallet::WalletStore;

use super::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub store: Arc<dyn ResourceStore>,
    pub catalog: Arc<CatalogService>,
    pub identity: Arc<IdentityService>,
    pub wallets: Arc<WalletStore>,
    pub payments: Arc<PaymentService>,
    pub provenance: Arc<ProvenanceService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>, store: Arc<dyn ResourceStore>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_window_secs, config.rate_limit_max));
        Self {
            catalog: Arc::new(CatalogService::new(store.clone())),
            identity: Arc::new(IdentityService::new(config.clone())),
            wallets: Arc::new(WalletStore::new()),
            payments: Arc::new(PaymentService::new()),
            provenance: Arc::new(ProvenanceService::new()),
            rate_limiter,
            config,
            store,
        }
    }
}
