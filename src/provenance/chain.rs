//! The append-only entity/activity chain itself (spec.md §4.H), modeled
//! after W3C PROV's alternation of entities and activities. Grounded in
//! `examples/other_examples/*chronicle*provenance.rs` for the entity/
//! activity field naming (`wasGeneratedBy`, `startedAtTime`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::ProvenanceError;

#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceEntity {
    pub id: String,
    pub label: String,
    pub snapshot: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceActivity {
    pub id: String,
    pub label: String,
    pub action_type: String,
    pub payload: Option<Value>,
    pub strategy: Option<String>,
    pub method: Option<String>,
    pub target_url: Option<String>,
    pub status_code: Option<u16>,
    pub duration_ms: Option<f64>,
    /// Back-reference to the entity this activity used — a lookup
    /// reference, never an ownership edge (spec.md §3 "Ownership").
    pub used_entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub agent_did: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum ChainItem {
    Entity(ProvenanceEntity),
    Activity(ProvenanceActivity),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceChain {
    pub id: String,
    pub agent_did: String,
    pub started_at: DateTime<Utc>,
    pub items: Vec<ChainItem>,
    pub sealed: bool,
    /// Id of the most recently appended entity; `None` before the chain
    /// has any entity at all.
    current_entity: Option<String>,
}

impl ProvenanceChain {
    /// Starts a new chain whose first item is an entity snapshot (spec.md
    /// §4.H: "the first item of a chain must be an entity").
    pub fn start(agent_did: &str, label: &str, snapshot: Value) -> Self {
        let started_at = Utc::now();
        let entity = ProvenanceEntity {
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            label: label.to_string(),
            snapshot,
            timestamp: started_at,
        };
        let current_entity = Some(entity.id.clone());
        Self {
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            agent_did: agent_did.to_string(),
            started_at,
            items: vec![ChainItem::Entity(entity)],
            sealed: false,
            current_entity,
        }
    }

    /// Appends an activity using the chain's current entity. Fails
    /// `NoCurrentEntity` if the chain has none, and `Sealed` if the
    /// chain has been sealed (spec.md §4.H).
    #[allow(clippy::too_many_arguments)]
    pub fn append_activity(
        &mut self,
        label: &str,
        action_type: &str,
        payload: Option<Value>,
        strategy: Option<String>,
        method: Option<String>,
        target_url: Option<String>,
        status_code: Option<u16>,
        duration_ms: Option<f64>,
    ) -> Result<String, ProvenanceError> {
        if self.sealed {
            return Err(ProvenanceError::Sealed);
        }
        let Some(used_entity_id) = self.current_entity.clone() else {
            return Err(ProvenanceError::NoCurrentEntity);
        };
        let activity = ProvenanceActivity {
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            label: label.to_string(),
            action_type: action_type.to_string(),
            payload,
            strategy,
            method,
            target_url,
            status_code,
            duration_ms,
            used_entity_id,
            timestamp: Utc::now(),
            agent_did: self.agent_did.clone(),
        };
        let id = activity.id.clone();
        self.items.push(ChainItem::Activity(activity));
        Ok(id)
    }

    /// Appends a result entity, advancing the chain's current-entity
    /// pointer (spec.md §4.H: "recording a result entity after an activity
    /// advances the current entity pointer to the new entity").
    pub fn append_entity(&mut self, label: &str, snapshot: Value) -> Result<String, ProvenanceError> {
        if self.sealed {
            return Err(ProvenanceError::Sealed);
        }
        let entity = ProvenanceEntity {
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            label: label.to_string(),
            snapshot,
            timestamp: Utc::now(),
        };
        let id = entity.id.clone();
        self.current_entity = Some(id.clone());
        self.items.push(ChainItem::Entity(entity));
        Ok(id)
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_item_is_always_an_entity() {
        let chain = ProvenanceChain::start("did:agent:1", "baseline", json!({}));
        assert!(matches!(chain.items[0], ChainItem::Entity(_)));
    }

    #[test]
    fn activity_without_current_entity_fails() {
        let mut chain = ProvenanceChain::start("did:agent:1", "baseline", json!({}));
        chain.current_entity = None;
        let err = chain.append_activity("fetch", "observe", None, None, None, None, None, None);
        assert!(matches!(err, Err(ProvenanceError::NoCurrentEntity)));
    }

    #[test]
    fn activity_used_entity_id_matches_current() {
        let mut chain = ProvenanceChain::start("did:agent:1", "baseline", json!({}));
        let baseline_id = match &chain.items[0] {
            ChainItem::Entity(e) => e.id.clone(),
            _ => unreachable!(),
        };
        chain
            .append_activity("fetch", "observe", None, None, None, None, None, None)
            .unwrap();
        match &chain.items[1] {
            ChainItem::Activity(a) => assert_eq!(a.used_entity_id, baseline_id),
            _ => unreachable!(),
        }
    }

    #[test]
    fn entity_after_activity_advances_current() {
        let mut chain = ProvenanceChain::start("did:agent:1", "baseline", json!({}));
        chain
            .append_activity("fetch", "observe", None, None, None, None, None, None)
            .unwrap();
        let new_id = chain.append_entity("result", json!({"ok": true})).unwrap();
        assert_eq!(chain.current_entity, Some(new_id));
    }

    #[test]
    fn sealed_chain_rejects_appends() {
        let mut chain = ProvenanceChain::start("did:agent:1", "baseline", json!({}));
        chain.seal();
        let err = chain.append_activity("fetch", "observe", None, None, None, None, None, None);
        assert!(matches!(err, Err(ProvenanceError::Sealed)));
    }
}
