//! Export encodings for a provenance chain (spec.md §4.H "Export"): a
//! linked-data bundle and a flat summary listing, selectable behind one
//! interface so more encodings can be added later without touching the
//! chain itself.

use serde::Serialize;
use serde_json::{json, Value};

use super::chain::{ChainItem, ProvenanceChain};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    LinkedData,
    Summary,
}

/// `{id, agent, startedAt, members}` where each member is a typed entity
/// or activity carrying its salient attributes (spec.md §4.H "Export").
fn linked_data_bundle(chain: &ProvenanceChain) -> Value {
    let members: Vec<Value> = chain
        .items
        .iter()
        .map(|item| match item {
            ChainItem::Entity(e) => json!({
                "type": "prov:Entity",
                "id": e.id,
                "label": e.label,
                "timestamp": e.timestamp,
                "snapshot": e.snapshot,
            }),
            ChainItem::Activity(a) => json!({
                "type": "prov:Activity",
                "id": a.id,
                "label": a.label,
                "actionType": a.action_type,
                "strategy": a.strategy,
                "method": a.method,
                "targetUrl": a.target_url,
                "statusCode": a.status_code,
                "duration": a.duration_ms,
                "usedEntityId": a.used_entity_id,
                "timestamp": a.timestamp,
            }),
        })
        .collect();

    json!({
        "id": chain.id,
        "agent": chain.agent_did,
        "startedAt": chain.started_at,
        "sealed": chain.sealed,
        "members": members,
    })
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    kind: &'static str,
    label: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// A flat, human-scannable listing: one row per item, no nested payload.
fn summary_listing(chain: &ProvenanceChain) -> Value {
    let rows: Vec<SummaryRow> = chain
        .items
        .iter()
        .map(|item| match item {
            ChainItem::Entity(e) => SummaryRow {
                kind: "entity",
                label: e.label.clone(),
                timestamp: e.timestamp,
            },
            ChainItem::Activity(a) => SummaryRow {
                kind: "activity",
                label: a.label.clone(),
                timestamp: a.timestamp,
            },
        })
        .collect();
    json!({
        "chainId": chain.id,
        "agent": chain.agent_did,
        "itemCount": rows.len(),
        "rows": rows,
    })
}

pub fn export(chain: &ProvenanceChain, format: ExportFormat) -> Value {
    match format {
        ExportFormat::LinkedData => linked_data_bundle(chain),
        ExportFormat::Summary => summary_listing(chain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json as j;

    #[test]
    fn linked_data_bundle_lists_every_member() {
        let mut chain = ProvenanceChain::start("did:agent:1", "baseline", j!({}));
        chain
            .append_activity("fetch", "observe", None, None, None, None, None, None)
            .unwrap();
        let bundle = export(&chain, ExportFormat::LinkedData);
        assert_eq!(bundle["members"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn summary_omits_nested_snapshot() {
        let chain = ProvenanceChain::start("did:agent:1", "baseline", j!({"secret": "x"}));
        let summary = export(&chain, ExportFormat::Summary);
        assert_eq!(summary["itemCount"], 1);
        assert!(summary["rows"][0].get("snapshot").is_none());
    }
}
