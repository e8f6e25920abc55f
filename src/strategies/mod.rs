//! Pluggable strategy contract (spec.md §4.L): each strategy declares the
//! resource types it can act on and, when asked, proposes a decision for
//! the agent runtime to weigh against every other strategy's proposal.
//! Grounded in the teacher's `src/venues/mod.rs` `Venue` trait — a small
//! object-safe interface multiple concrete implementations plug into.

pub mod analytics;
pub mod retail;

use serde_json::Value;

use crate::ld::{Operation, Resource};
use crate::wallet::WalletState;

pub use analytics::AnalyticsStrategy;
pub use retail::RetailStrategy;

/// What a strategy proposes for the current resource (spec.md §4.K
/// "Negotiate").
#[derive(Debug, Clone, Default)]
pub struct Decision {
    pub should_execute: bool,
    pub operation: Option<Operation>,
    pub input: Option<Value>,
    pub navigate_to: Option<String>,
    pub reason: String,
    pub priority: u8,
}

impl Decision {
    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }
}

/// Context a strategy evaluates against: the resource currently being
/// observed, the acting wallet, and a caller-provided price ceiling.
pub struct StrategyContext<'a> {
    pub resource: &'a Resource,
    pub wallet: &'a WalletState,
    pub max_price: u64,
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn trigger_types(&self) -> &'static [&'static str];
    fn description(&self) -> &'static str;

    /// Type intersection: does this strategy apply to the resource's
    /// declared types at all (spec.md §4.L "selected by type
    /// intersection")?
    fn matches(&self, resource: &Resource) -> bool {
        self.trigger_types().iter().any(|t| resource.is_of_type(t))
            || resource
                .member
                .iter()
                .flatten()
                .any(|m| self.trigger_types().iter().any(|t| m.is_of_type(t)))
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Decision;
}
