//! Command-line surface (spec.md §4.I, §4.K). Grounded in the teacher's
//! `src/cli.rs` `Cli`/`Command` clap derive shape, generalized from the
//! teacher's workflow-file subcommands to HyprCAT's two runtime modes:
//! run the gateway, or run an autonomous agent against one.

use std::time::Duration;

use clap::{Parser, Subcommand};

/// HyprCAT — a hypermedia-driven data marketplace gateway and agent runtime.
#[derive(Parser)]
#[command(name = "hyprcat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HyprCAT gateway, serving the catalog, checkout, query, and
    /// identity surfaces over HTTP.
    Serve,

    /// Run an autonomous agent (the O.N.A. loop) against a running
    /// gateway until completion, `maxIterations`, or an error.
    Agent {
        /// DID the agent authenticates and transacts as.
        #[arg(long)]
        did: String,

        /// Resource URL the agent starts observing from.
        #[arg(long)]
        start_url: String,

        /// Maximum number of Observe/Negotiate/Attest iterations.
        #[arg(long, default_value = "10")]
        max_iterations: u32,

        /// Delay between iterations, in milliseconds.
        #[arg(long, default_value = "0")]
        iteration_delay_ms: u64,

        /// Permit the agent to settle `PaymentRequired` responses itself,
        /// up to `auto-pay-max-amount`.
        #[arg(long)]
        auto_pay: bool,

        /// Ceiling (in the invoice's own currency) below which `--auto-pay`
        /// settles a payment without further confirmation.
        #[arg(long, default_value = "0")]
        auto_pay_max_amount: u64,

        /// Price ceiling strategies weigh candidate purchases against.
        #[arg(long)]
        max_price: Option<u64>,

        /// Bearer token to authenticate the agent's requests, if already
        /// issued by a prior `/auth/verify` call.
        #[arg(long)]
        bearer_token: Option<String>,
    },
}

impl Command {
    pub fn iteration_delay(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }
}
