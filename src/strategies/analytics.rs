//! Analytics strategy (spec.md §4.L): prefers a query affordance on a
//! data-product or virtual-graph resource, falling back to a download
//! affordance, emitting a default query unless the caller overrides it.

use crate::ld::HttpMethod;

use super::{Decision, Strategy, StrategyContext};

const DEFAULT_QUERY: &str = "SELECT * FROM analytics LIMIT 10";

pub struct AnalyticsStrategy;

impl Strategy for AnalyticsStrategy {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn trigger_types(&self) -> &'static [&'static str] {
        &["dcat:Dataset", "hyprcat:VirtualGraph"]
    }

    fn description(&self) -> &'static str {
        "Runs a federated query against a data product, or falls back to downloading it."
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Decision {
        let candidates: Vec<&crate::ld::Resource> = ctx
            .resource
            .member
            .iter()
            .flatten()
            .chain(std::iter::once(ctx.resource))
            .filter(|r| self.trigger_types().iter().any(|t| r.is_of_type(t)))
            .collect();

        for candidate in &candidates {
            if let Some(op) = candidate
                .operation
                .iter()
                .flatten()
                .find(|op| op.method == HttpMethod::Post && op.title.to_lowercase().contains("query"))
            {
                return Decision {
                    should_execute: true,
                    operation: Some(op.clone()),
                    input: Some(serde_json::json!({ "query": DEFAULT_QUERY })),
                    navigate_to: None,
                    reason: format!("{} offers a query affordance", candidate.id),
                    priority: 8,
                };
            }
        }

        for candidate in &candidates {
            if let Some(op) = candidate
                .operation
                .iter()
                .flatten()
                .find(|op| op.method == HttpMethod::Get && op.title.to_lowercase().contains("download"))
            {
                return Decision {
                    should_execute: true,
                    operation: Some(op.clone()),
                    input: None,
                    navigate_to: None,
                    reason: format!("{} offers a download affordance", candidate.id),
                    priority: 6,
                };
            }
        }

        Decision::skip("no query or download affordance found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ld::{Operation, Resource};
    use crate::wallet::WalletStore;

    fn data_product(op_title: &str, method: HttpMethod) -> Resource {
        Resource::new("https://x/dataproduct/1", vec!["dcat:Dataset".into()]).with_operations(vec![
            Operation {
                method,
                title: op_title.into(),
                expects: None,
                returns: None,
                target: None,
                constraint: None,
            },
        ])
    }

    #[test]
    fn prefers_query_over_download() {
        let resource = data_product("Run federated query", HttpMethod::Post);
        let store = WalletStore::new();
        let wallet = store.ensure("did:agent:1");
        let ctx = StrategyContext {
            resource: &resource,
            wallet: &wallet,
            max_price: 1000,
        };
        let decision = AnalyticsStrategy.evaluate(&ctx);
        assert!(decision.should_execute);
        assert_eq!(decision.priority, 8);
    }

    #[test]
    fn falls_back_to_download() {
        let resource = data_product("Download dataset", HttpMethod::Get);
        let store = WalletStore::new();
        let wallet = store.ensure("did:agent:1");
        let ctx = StrategyContext {
            resource: &resource,
            wallet: &wallet,
            max_price: 1000,
        };
        let decision = AnalyticsStrategy.evaluate(&ctx);
        assert!(decision.should_execute);
        assert_eq!(decision.priority, 6);
    }
}
