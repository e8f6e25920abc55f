//! The deterministic demonstration mesh seeded on startup (spec.md §4.C):
//! one service description, one root document, one catalog collection,
//! one retail store (paid product), one data product (query affordance),
//! one learning-record resource (export affordance), and a prompts
//! collection. Grounded in `src/engine/mod.rs`'s top-of-file doc comment
//! style for describing a component's responsibility, and in
//! `src/api/history.rs`'s habit of building fixed demonstration data
//! deterministically rather than from randomness.

use serde_json::json;

use crate::ld::{Constraint, HttpMethod, Operation, PropertyShape, Resource};

pub const SERVICE_DESCRIPTION_ID: &str = "https://hyprcat.example/.well-known/hyprcat";
pub const ROOT_ID: &str = "https://hyprcat.example/";
pub const CATALOG_ID: &str = "https://hyprcat.example/catalog";
pub const RETAIL_STORE_ID: &str = "https://hyprcat.example/nodes/store/widgets";
pub const DATA_PRODUCT_ID: &str = "https://hyprcat.example/nodes/dataproduct/usage-analytics";
pub const LEARNING_RECORD_ID: &str = "https://hyprcat.example/nodes/lrs/agent-runs";
pub const PROMPTS_ID: &str = "https://hyprcat.example/prompts";

fn service_description() -> Resource {
    Resource::new(SERVICE_DESCRIPTION_ID, vec!["hydra:ApiDocumentation".into()])
        .with_context()
        .with_property("schema:name", json!("HyprCAT Gateway"))
        .with_property("schema:description", json!(
            "Hypermedia-driven data marketplace gateway: catalog, governance, federation, provenance."
        ))
        .with_operations(vec![Operation {
            method: HttpMethod::Get,
            title: "Root document".into(),
            expects: None,
            returns: Some("hydra:Collection".into()),
            target: Some(ROOT_ID.into()),
            constraint: None,
        }])
}

fn root_document() -> Resource {
    Resource::new(ROOT_ID, vec!["hydra:EntryPoint".into()])
        .with_context()
        .with_property("schema:name", json!("HyprCAT"))
        .with_operations(vec![Operation {
            method: HttpMethod::Get,
            title: "Browse catalog".into(),
            expects: None,
            returns: Some("hydra:Collection".into()),
            target: Some(CATALOG_ID.into()),
            constraint: None,
        }])
}

fn catalog_collection() -> Resource {
    Resource::new(CATALOG_ID, vec!["hydra:Collection".into()])
        .with_context()
        .with_property("schema:name", json!("Catalog"))
        .with_members(vec![])
}

fn retail_store() -> Resource {
    Resource::new(RETAIL_STORE_ID, vec!["schema:Product".into()])
        .with_context()
        .with_property("schema:name", json!("Widget subscription"))
        .with_property("schema:description", json!("A recurring widget delivery product."))
        .with_property("hyprcat:domain", json!("retail"))
        .with_property("schema:price", json!(500))
        .with_property("schema:stock", json!(42))
        .with_operations(vec![Operation {
            method: HttpMethod::Post,
            title: "Purchase widget subscription".into(),
            expects: Some(vec![PropertyShape {
                property: "quantity".into(),
                required: true,
                datatype: Some("integer".into()),
                min_inclusive: Some(1.0),
                ..Default::default()
            }]),
            returns: Some("schema:Order".into()),
            target: None,
            constraint: Some(Constraint::Payment {
                amount: 500,
                currency: "SAT".into(),
                recipient: "did:pkh:eip155:1:0x000000000000000000000000000000000000a1".into(),
            }),
        }])
}

fn data_product() -> Resource {
    Resource::new(DATA_PRODUCT_ID, vec!["dcat:Dataset".into()])
        .with_context()
        .with_property("schema:name", json!("Usage analytics virtual graph"))
        .with_property("schema:description", json!("Federated usage analytics across backing sources."))
        .with_property("hyprcat:domain", json!("analytics"))
        .with_operations(vec![Operation {
            method: HttpMethod::Post,
            title: "Run federated query".into(),
            expects: Some(vec![PropertyShape {
                property: "query".into(),
                required: true,
                datatype: Some("string".into()),
                min_length: Some(1),
                ..Default::default()
            }]),
            returns: Some("hyprcat:QueryResult".into()),
            target: Some("https://hyprcat.example/operations/query".into()),
            constraint: Some(Constraint::TokenGate {
                required_token: "ANALYTICS_PASS".into(),
                min_balance: 1,
                chain_id: None,
                standard: None,
            }),
        }])
}

fn learning_record_resource() -> Resource {
    Resource::new(LEARNING_RECORD_ID, vec!["hyprcat:LearningRecordStore".into()])
        .with_context()
        .with_property("schema:name", json!("Agent run history"))
        .with_operations(vec![Operation {
            method: HttpMethod::Get,
            title: "Export provenance history".into(),
            expects: None,
            returns: Some("prov:Bundle".into()),
            target: Some("https://hyprcat.example/operations/lrs/export".into()),
            constraint: None,
        }])
}

fn prompts_collection() -> Resource {
    Resource::new(PROMPTS_ID, vec!["hydra:Collection".into()])
        .with_context()
        .with_property("schema:name", json!("Agent prompts"))
        .with_members(vec![
            Resource::new(format!("{PROMPTS_ID}/observe-retail"), vec!["hyprcat:Prompt".into()])
                .with_property("schema:text", json!("Inspect the retail store and consider purchasing.")),
            Resource::new(format!("{PROMPTS_ID}/observe-analytics"), vec!["hyprcat:Prompt".into()])
                .with_property("schema:text", json!("Query the usage analytics data product for trends.")),
        ])
}

/// The full deterministic seed set, in registration order.
pub fn seed_resources() -> Vec<Resource> {
    vec![
        service_description(),
        root_document(),
        catalog_collection(),
        retail_store(),
        data_product(),
        learning_record_resource(),
        prompts_collection(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_deterministic() {
        let first: Vec<String> = seed_resources().into_iter().map(|r| r.id).collect();
        let second: Vec<String> = seed_resources().into_iter().map(|r| r.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn retail_store_carries_payment_constraint() {
        let store = retail_store();
        let op = &store.operation.unwrap()[0];
        assert!(matches!(op.constraint, Some(Constraint::Payment { .. })));
    }

    #[test]
    fn data_product_carries_query_affordance() {
        let product = data_product();
        let op = &product.operation.unwrap()[0];
        assert_eq!(op.target.as_deref(), Some("https://hyprcat.example/operations/query"));
    }
}
