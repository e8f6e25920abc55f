//! Agent runtime — the O.N.A. (Observe, Negotiate, Attest) loop (spec.md
//! §4.K). Grounded in the teacher's `src/engine/mod.rs` shape of an engine
//! driven by externally invoked `tick()` calls rather than owning its own
//! scheduler thread.

pub mod config;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;

pub use config::AgentConfig;

use crate::client::{FetchError, Navigator};
use crate::governance::{self, PolicyContext};
use crate::ld::{Constraint, Operation};
use crate::provenance::{ExportFormat, ProvenanceService};
use crate::strategies::{Decision, Strategy, StrategyContext};
use crate::wallet::WalletStore;

/// Derives a PROV `actionType` from what the operation declares it
/// `returns` (spec.md §8 scenario 5 requires a purchase's final activity
/// to carry `BuyAction`), rather than a single flat label for every kind
/// of attested operation.
fn action_type_for(operation: &Operation) -> String {
    match operation.returns.as_deref() {
        Some(returns) if returns.to_lowercase().contains("order") => "BuyAction".to_string(),
        Some(returns) => {
            let local = returns.rsplit(':').next().unwrap_or(returns);
            format!("{local}Action")
        }
        None => "ExecuteAction".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Running,
    Paused,
    Completed,
    Error,
}

/// What the runtime decided to do this iteration, after weighing every
/// strategy's proposal (spec.md §4.K "Negotiate").
enum NextAction {
    Execute(Decision),
    Navigate(String),
    Complete,
}

/// Collects every matching strategy's decision and picks the highest
/// priority executable one; failing that, a `navigateTo` suggestion;
/// failing that, the first unvisited collection member; otherwise the
/// run completes (spec.md §4.K "Negotiate").
fn select_next_action(
    decisions: &[Decision],
    resource: &crate::ld::Resource,
    visited: &dyn Fn(&str) -> bool,
) -> NextAction {
    if let Some(best) = decisions
        .iter()
        .filter(|d| d.should_execute)
        .max_by_key(|d| d.priority)
    {
        return NextAction::Execute(best.clone());
    }

    if let Some(nav) = decisions.iter().find_map(|d| d.navigate_to.clone()) {
        return NextAction::Navigate(nav);
    }

    if let Some(next) = resource
        .member
        .iter()
        .flatten()
        .find(|m| !visited(&m.id))
        .map(|m| m.id.clone())
    {
        return NextAction::Navigate(next);
    }

    NextAction::Complete
}

pub struct AgentRuntime {
    config: AgentConfig,
    navigator: Navigator,
    wallets: Arc<WalletStore>,
    provenance: Arc<ProvenanceService>,
    strategies: Vec<Box<dyn Strategy>>,
    state: Mutex<AgentState>,
    chain_id: Mutex<Option<String>>,
    current_url: Mutex<String>,
}

impl AgentRuntime {
    pub fn new(
        config: AgentConfig,
        navigator: Navigator,
        wallets: Arc<WalletStore>,
        provenance: Arc<ProvenanceService>,
        strategies: Vec<Box<dyn Strategy>>,
    ) -> Self {
        let start_url = config.start_url.clone();
        Self {
            config,
            navigator,
            wallets,
            provenance,
            strategies,
            state: Mutex::new(AgentState::Idle),
            chain_id: Mutex::new(None),
            current_url: Mutex::new(start_url),
        }
    }

    pub fn state(&self) -> AgentState {
        *self.state.lock().unwrap()
    }

    pub fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == AgentState::Running {
            *state = AgentState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == AgentState::Paused {
            *state = AgentState::Running;
        }
    }

    /// Runs iterations until completion, `maxIterations`, an explicit
    /// pause, or an error (spec.md §4.K "Termination").
    pub async fn run(&self) {
        *self.state.lock().unwrap() = AgentState::Running;
        for _ in 0..self.config.max_iterations {
            if self.state() != AgentState::Running {
                break;
            }
            if self.tick().await.is_err() {
                *self.state.lock().unwrap() = AgentState::Error;
                return;
            }
            if self.state() == AgentState::Completed {
                return;
            }
            if !self.config.iteration_delay.is_zero() {
                tokio::time::sleep(self.config.iteration_delay).await;
            }
        }
        let mut state = self.state.lock().unwrap();
        if *state == AgentState::Running {
            *state = AgentState::Completed;
        }
    }

    /// One Observe → Negotiate → Attest iteration.
    async fn tick(&self) -> Result<(), FetchError> {
        let url = self.current_url.lock().unwrap().clone();

        // Observe.
        let resource = match self.navigator.fetch(&url).await {
            Ok(r) => r,
            Err(FetchError::PaymentRequired(invoice)) if self.can_auto_pay(invoice.amount) => {
                self.pay_invoice(&invoice.invoice_id, invoice.amount, &invoice.currency)?;
                self.navigator.fetch(&url).await?
            }
            Err(e) => return Err(e),
        };

        let chain_id = self.ensure_chain(&resource);
        self.provenance
            .with_chain_mut(&self.config.agent_did, &chain_id, |_| {})
            .ok();

        let wallet = self.wallets.ensure(&self.config.agent_did);
        let decisions: Vec<Decision> = self
            .strategies
            .iter()
            .filter(|s| s.matches(&resource))
            .map(|s| {
                s.evaluate(&StrategyContext {
                    resource: &resource,
                    wallet: &wallet,
                    max_price: self.config.max_price,
                })
            })
            .collect();

        let visited = |u: &str| self.navigator.has_visited(u);
        match select_next_action(&decisions, &resource, &visited) {
            NextAction::Execute(decision) => {
                self.attest(&resource, decision).await;
            }
            NextAction::Navigate(next_url) => {
                *self.current_url.lock().unwrap() = next_url;
            }
            NextAction::Complete => {
                *self.state.lock().unwrap() = AgentState::Completed;
            }
        }
        Ok(())
    }

    fn can_auto_pay(&self, amount: u64) -> bool {
        self.config.auto_pay_enabled
            && amount <= self.config.auto_pay_max_amount
            && self.wallets.get(&self.config.agent_did).is_some_and(|w| w.balance("SAT") >= amount)
    }

    fn pay_invoice(&self, invoice_id: &str, amount: u64, currency: &str) -> Result<(), FetchError> {
        self.wallets
            .debit(&self.config.agent_did, currency, amount)
            .map_err(|_| FetchError::Transport("auto-pay debit failed".to_string()))?;
        let _ = invoice_id;
        Ok(())
    }

    fn ensure_chain(&self, resource: &crate::ld::Resource) -> String {
        let mut chain_id = self.chain_id.lock().unwrap();
        if let Some(id) = chain_id.as_ref() {
            return id.clone();
        }
        let id = self.provenance.start_chain(
            &self.config.agent_did,
            "observation",
            serde_json::to_value(resource).unwrap_or(Value::Null),
        );
        *chain_id = Some(id.clone());
        id
    }

    /// Attest: satisfy any constraint on the chosen operation, execute it,
    /// and record the activity (spec.md §4.K "Attest").
    async fn attest(&self, parent: &crate::ld::Resource, decision: Decision) {
        let Some(operation) = decision.operation else {
            return;
        };
        let chain_id = self.chain_id.lock().unwrap().clone();
        let Some(chain_id) = chain_id else { return };
        let input = decision.input.unwrap_or(Value::Null);
        let started = Instant::now();
        let action_type = action_type_for(&operation);

        let mut extra_headers: Vec<(String, String)> = Vec::new();
        if let Some(constraint) = &operation.constraint {
            if let Err(reason) = self.satisfy_constraint(constraint, &mut extra_headers).await {
                let _ = self.provenance.with_chain_mut(&self.config.agent_did, &chain_id, |chain| {
                    chain.append_activity(
                        "constraint-failure",
                        &action_type,
                        Some(input.clone()),
                        Some("agent".to_string()),
                        Some(operation.method.as_str().to_string()),
                        Some(operation.target_or(&parent.id).to_string()),
                        Some(500),
                        Some(started.elapsed().as_secs_f64() * 1000.0),
                    )
                });
                tracing::warn!(reason, "constraint not satisfied, aborting attest");
                return;
            }
        }

        let header_refs: Vec<(&str, &str)> = extra_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let result = self
            .navigator
            .execute_operation_with_headers(&operation, &parent.id, &input, &header_refs)
            .await;

        let status_code = match &result {
            Ok(outcome) => outcome.status,
            Err(_) => 500,
        };
        let _ = self.provenance.with_chain_mut(&self.config.agent_did, &chain_id, |chain| {
            chain.append_activity(
                decision.reason.as_str(),
                &action_type,
                Some(input.clone()),
                Some("agent".to_string()),
                Some(operation.method.as_str().to_string()),
                Some(operation.target_or(&parent.id).to_string()),
                Some(status_code),
                Some(started.elapsed().as_secs_f64() * 1000.0),
            )
        });

        if let Ok(outcome) = result {
            let _ = self.provenance.with_chain_mut(&self.config.agent_did, &chain_id, |chain| {
                chain.append_entity("result", serde_json::to_value(&outcome.resource).unwrap_or(Value::Null))
            });
        }
    }

    async fn satisfy_constraint(
        &self,
        constraint: &Constraint,
        extra_headers: &mut Vec<(String, String)>,
    ) -> Result<(), &'static str> {
        if let Some((amount, currency, _recipient)) = governance::payment::payment_terms(constraint) {
            // The proof itself is opaque to the gateway (spec.md §4.F only
            // checks its length); what matters is that the agent attaches
            // *something* attributable to this payment attempt.
            let proof = format!(
                "sim:{}:{amount}:{currency}:{}",
                self.config.agent_did,
                uuid::Uuid::new_v4()
            );
            extra_headers.push(("X-Payment-Proof".to_string(), proof));
            return Ok(());
        }

        let wallet = self.wallets.ensure(&self.config.agent_did);
        let ctx = PolicyContext {
            target: &self.config.agent_did,
            action: "execute",
            facts: &Default::default(),
        };
        governance::check_non_payment_constraint(constraint, &wallet, Some(&ctx))
            .map_err(|_| "policy or token gate check failed")
    }

    pub fn export_history(&self, format: ExportFormat) -> Option<Value> {
        let chain_id = self.chain_id.lock().unwrap().clone()?;
        self.provenance
            .export_chain(&self.config.agent_did, &chain_id, format)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ld::Resource;
    use crate::strategies::Decision;

    #[test]
    fn executable_decision_wins_over_navigation() {
        let resource = Resource::new("https://x/a", vec!["hydra:Collection".into()]);
        let decisions = vec![
            Decision {
                should_execute: false,
                navigate_to: Some("https://x/b".into()),
                ..Default::default()
            },
            Decision {
                should_execute: true,
                priority: 10,
                ..Default::default()
            },
        ];
        let visited = |_: &str| false;
        assert!(matches!(
            select_next_action(&decisions, &resource, &visited),
            NextAction::Execute(_)
        ));
    }

    #[test]
    fn falls_back_to_first_unvisited_member() {
        let member = Resource::new("https://x/b", vec!["schema:Thing".into()]);
        let resource = Resource::new("https://x/a", vec!["hydra:Collection".into()])
            .with_members(vec![member]);
        let decisions = vec![];
        let visited = |_: &str| false;
        match select_next_action(&decisions, &resource, &visited) {
            NextAction::Navigate(url) => assert_eq!(url, "https://x/b"),
            _ => panic!("expected navigation"),
        }
    }

    #[test]
    fn completes_when_nothing_left_to_explore() {
        let resource = Resource::new("https://x/a", vec!["hydra:Collection".into()]);
        let decisions = vec![];
        let visited = |_: &str| true;
        assert!(matches!(
            select_next_action(&decisions, &resource, &visited),
            NextAction::Complete
        ));
    }
}
