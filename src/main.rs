//! Entry point. Grounded in the teacher's `src/main.rs`: a thin clap
//! dispatch into per-subcommand modules, with the HTTP surface run on a
//! constructed `tokio` runtime — generalized here to `#[tokio::main]`
//! since, unlike the teacher, every one of HyprCAT's subcommands is
//! async (the gateway server and the agent's own fetch loop alike).

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use hyprcat::agent::{AgentConfig, AgentRuntime};
use hyprcat::client::{Navigator, NavigatorConfig};
use hyprcat::config::GatewayConfig;
use hyprcat::provenance::ProvenanceService;
use hyprcat::strategies::{AnalyticsStrategy, RetailStrategy, Strategy};
use hyprcat::wallet::WalletStore;
use hyprcat::{api, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Serve => api::serve(GatewayConfig::from_env()).await,
        cli::Command::Agent {
            did,
            start_url,
            max_iterations,
            iteration_delay_ms,
            auto_pay,
            auto_pay_max_amount,
            max_price,
            bearer_token,
        } => {
            let mut config = AgentConfig::new(did.clone(), start_url);
            config.max_iterations = max_iterations;
            config.iteration_delay = cli::Command::iteration_delay(iteration_delay_ms);
            config.auto_pay_enabled = auto_pay;
            config.auto_pay_max_amount = auto_pay_max_amount;
            if let Some(max_price) = max_price {
                config.max_price = max_price;
            }

            let navigator = Navigator::new(NavigatorConfig {
                bearer_token,
                agent_did: Some(did),
            });
            let wallets = Arc::new(WalletStore::new());
            let provenance = Arc::new(ProvenanceService::new());
            let strategies: Vec<Box<dyn Strategy>> =
                vec![Box::new(RetailStrategy), Box::new(AnalyticsStrategy)];

            let runtime = AgentRuntime::new(config, navigator, wallets, provenance, strategies);
            runtime.run().await;
            Ok(())
        }
    }
}
