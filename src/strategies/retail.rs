//! Retail strategy (spec.md §4.L): buys the first affordable, in-stock
//! product it finds among the current resource's members.

use crate::ld::HttpMethod;

use super::{Decision, Strategy, StrategyContext};

pub struct RetailStrategy;

impl Strategy for RetailStrategy {
    fn name(&self) -> &'static str {
        "retail"
    }

    fn trigger_types(&self) -> &'static [&'static str] {
        &["schema:Product", "hydra:Collection"]
    }

    fn description(&self) -> &'static str {
        "Purchases the first in-stock product within the configured price ceiling."
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Decision {
        let candidates = ctx
            .resource
            .member
            .iter()
            .flatten()
            .chain(std::iter::once(ctx.resource));

        for candidate in candidates {
            if !candidate.is_of_type("schema:Product") {
                continue;
            }
            let price = candidate.extra.get("schema:price").and_then(|v| v.as_u64());
            let stock = candidate.extra.get("schema:stock").and_then(|v| v.as_u64());
            let Some(buy_op) = candidate
                .operation
                .iter()
                .flatten()
                .find(|op| op.method == HttpMethod::Post)
            else {
                continue;
            };

            match (price, stock) {
                (Some(price), Some(stock))
                    if stock > 0 && price <= ctx.max_price && ctx.wallet.balance("SAT") >= price =>
                {
                    return Decision {
                        should_execute: true,
                        operation: Some(buy_op.clone()),
                        input: Some(serde_json::json!({ "quantity": 1 })),
                        navigate_to: None,
                        reason: format!("{} is in stock and within budget", candidate.id),
                        priority: 10,
                    };
                }
                _ => continue,
            }
        }

        Decision::skip("no affordable in-stock product found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ld::{Operation, Resource};
    use crate::wallet::WalletStore;
    use serde_json::json;

    fn product(price: u64, stock: u64) -> Resource {
        Resource::new("https://x/product/1", vec!["schema:Product".into()])
            .with_property("schema:price", json!(price))
            .with_property("schema:stock", json!(stock))
            .with_operations(vec![Operation {
                method: HttpMethod::Post,
                title: "Buy".into(),
                expects: None,
                returns: None,
                target: None,
                constraint: None,
            }])
    }

    #[test]
    fn chooses_affordable_in_stock_product() {
        let collection = Resource::new("https://x/catalog", vec!["hydra:Collection".into()])
            .with_members(vec![product(500, 3)]);
        let store = WalletStore::new();
        let wallet = store.ensure("did:agent:1");
        let ctx = StrategyContext {
            resource: &collection,
            wallet: &wallet,
            max_price: 1000,
        };
        let decision = RetailStrategy.evaluate(&ctx);
        assert!(decision.should_execute);
        assert_eq!(decision.priority, 10);
    }

    #[test]
    fn skips_out_of_stock_product() {
        let collection = Resource::new("https://x/catalog", vec!["hydra:Collection".into()])
            .with_members(vec![product(500, 0)]);
        let store = WalletStore::new();
        let wallet = store.ensure("did:agent:1");
        let ctx = StrategyContext {
            resource: &collection,
            wallet: &wallet,
            max_price: 1000,
        };
        assert!(!RetailStrategy.evaluate(&ctx).should_execute);
    }

    #[test]
    fn skips_product_over_budget() {
        let collection = Resource::new("https://x/catalog", vec!["hydra:Collection".into()])
            .with_members(vec![product(5000, 3)]);
        let store = WalletStore::new();
        let wallet = store.ensure("did:agent:1");
        let ctx = StrategyContext {
            resource: &collection,
            wallet: &wallet,
            max_price: 1000,
        };
        assert!(!RetailStrategy.evaluate(&ctx).should_execute);
    }
}
