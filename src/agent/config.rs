//! Agent runtime configuration (spec.md §4.K).

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub agent_did: String,
    pub start_url: String,
    pub max_iterations: u32,
    pub iteration_delay: std::time::Duration,
    pub auto_pay_enabled: bool,
    pub auto_pay_max_amount: u64,
    /// Price ceiling strategies weigh candidate purchases against; not
    /// part of the spec's config tuple but needed to drive
    /// [`crate::strategies::StrategyContext`] deterministically.
    pub max_price: u64,
}

impl AgentConfig {
    pub fn new(agent_did: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            agent_did: agent_did.into(),
            start_url: start_url.into(),
            max_iterations: 10,
            iteration_delay: std::time::Duration::from_millis(0),
            auto_pay_enabled: false,
            auto_pay_max_amount: 0,
            max_price: u64::MAX,
        }
    }
}
