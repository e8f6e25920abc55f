//! Provenance service (spec.md §4.H): per-agent append-only chains of
//! alternating entity/activity items, owned exclusively by this service
//! and keyed by agent DID (spec.md §3 "Ownership and lifetimes").

pub mod chain;
pub mod export;

use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

pub use chain::{ChainItem, ProvenanceActivity, ProvenanceChain, ProvenanceEntity};
pub use export::ExportFormat;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceError {
    #[error("activity cannot be appended: chain has no current entity")]
    NoCurrentEntity,
    #[error("chain is sealed")]
    Sealed,
    #[error("unknown chain")]
    UnknownChain,
}

/// Owns every chain ever started, indexed by agent DID; an agent may have
/// more than one chain over its lifetime (e.g. one per long-running
/// session), so each DID maps to a list ordered by start time.
#[derive(Default)]
pub struct ProvenanceService {
    chains_by_agent: DashMap<String, Vec<ProvenanceChain>>,
}

impl ProvenanceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh chain for an agent and returns its id.
    pub fn start_chain(&self, agent_did: &str, label: &str, snapshot: Value) -> String {
        let chain = ProvenanceChain::start(agent_did, label, snapshot);
        let id = chain.id.clone();
        self.chains_by_agent
            .entry(agent_did.to_string())
            .or_default()
            .push(chain);
        id
    }

    /// Applies a mutating closure to the named chain, looked up by agent
    /// DID and chain id.
    pub fn with_chain_mut<T>(
        &self,
        agent_did: &str,
        chain_id: &str,
        f: impl FnOnce(&mut ProvenanceChain) -> T,
    ) -> Result<T, ProvenanceError> {
        let mut chains = self
            .chains_by_agent
            .get_mut(agent_did)
            .ok_or(ProvenanceError::UnknownChain)?;
        let chain = chains
            .iter_mut()
            .find(|c| c.id == chain_id)
            .ok_or(ProvenanceError::UnknownChain)?;
        Ok(f(chain))
    }

    /// `historyOf(did)`: every chain belonging to an agent, ordered by
    /// start time ascending (spec.md §4.H "Query").
    pub fn history_of(&self, agent_did: &str) -> Vec<ProvenanceChain> {
        let mut chains = self
            .chains_by_agent
            .get(agent_did)
            .map(|v| v.clone())
            .unwrap_or_default();
        chains.sort_by_key(|c| c.started_at);
        chains
    }

    pub fn export_chain(
        &self,
        agent_did: &str,
        chain_id: &str,
        format: ExportFormat,
    ) -> Result<Value, ProvenanceError> {
        self.with_chain_mut(agent_did, chain_id, |chain| export::export(chain, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_of_orders_by_start_time() {
        let svc = ProvenanceService::new();
        let first = svc.start_chain("did:agent:1", "baseline-1", json!({}));
        let second = svc.start_chain("did:agent:1", "baseline-2", json!({}));
        let history = svc.history_of("did:agent:1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first);
        assert_eq!(history[1].id, second);
    }

    #[test]
    fn unknown_agent_has_empty_history() {
        let svc = ProvenanceService::new();
        assert!(svc.history_of("did:agent:nobody").is_empty());
    }

    #[test]
    fn with_chain_mut_allows_appends() {
        let svc = ProvenanceService::new();
        let chain_id = svc.start_chain("did:agent:1", "baseline", json!({}));
        let result = svc.with_chain_mut("did:agent:1", &chain_id, |chain| {
            chain.append_activity("fetch", "observe", None, None, None, None, None, None)
        });
        assert!(result.unwrap().is_ok());
    }
}
