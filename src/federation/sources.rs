//! Simulated backing sources (spec.md §4.G "source dictionary"): each
//! source is a small fixed dataset standing in for a real upstream system.
//! Grounded in `src/sim/wallet.rs`'s pattern of a deterministic, in-memory
//! simulator used where the real external system is out of scope.

use serde_json::{json, Value};

/// Returns the fixed row set for a named source, or `None` if the source
/// is not registered (spec.md §4.G: unknown sources are a planning error,
/// not a dispatch-time one, since we recognize table names up front).
pub fn rows_for(source: &str) -> Option<Vec<Value>> {
    match source {
        "analytics" => Some(vec![
            json!({"user_id": "u-1", "total_spend": 820, "segment": "enterprise"}),
            json!({"user_id": "u-2", "total_spend": 140, "segment": "retail"}),
            json!({"user_id": "u-3", "total_spend": 990, "segment": "enterprise"}),
        ]),
        "sales" => Some(vec![
            json!({"order_id": "o-1", "sku": "widget-a", "amount": 42, "region": "na"}),
            json!({"order_id": "o-2", "sku": "widget-b", "amount": 17, "region": "eu"}),
            json!({"order_id": "o-3", "sku": "widget-a", "amount": 65, "region": "na"}),
        ]),
        "inventory" => Some(vec![
            json!({"sku": "widget-a", "on_hand": 120, "warehouse": "w-1"}),
            json!({"sku": "widget-b", "on_hand": 0, "warehouse": "w-2"}),
        ]),
        "telemetry" => Some(vec![
            json!({"device_id": "d-1", "reading": 21.5, "unit": "celsius"}),
            json!({"device_id": "d-2", "reading": 19.8, "unit": "celsius"}),
        ]),
        "default" => Some(vec![json!({"message": "no specific source matched"})]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sources_return_rows() {
        assert!(rows_for("analytics").is_some());
        assert!(rows_for("sales").is_some());
    }

    #[test]
    fn unknown_source_is_none() {
        assert!(rows_for("nonexistent-source").is_none());
    }
}
