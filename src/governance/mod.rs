//! Governance pipeline (spec.md §4.F): payment, token gate, and policy
//! constraints, composable with AND/OR at a single level.

pub mod payment;
pub mod policy;
pub mod token_gate;

use thiserror::Error;

use crate::ld::{CompositeOp, Constraint};
use crate::wallet::WalletState;

pub use payment::{PaymentAttempt, PaymentInvoice, PaymentReceipt, PaymentService};
pub use policy::PolicyContext;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("payment required")]
    PaymentRequired,
    #[error("unknown invoice")]
    UnknownInvoice,
    #[error("invoice expired")]
    InvoiceExpired,
    #[error("invalid payment proof")]
    InvalidProof,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("access denied")]
    AccessDenied,
}

/// Evaluates a (possibly composite) constraint against a wallet snapshot,
/// for the non-payment kinds (token gate, policy) where there's no invoice
/// round-trip — payment constraints are handled separately by
/// [`PaymentService`] since they require issuing a 402 before a caller has
/// anything to prove. Returns `Ok(())` on success.
pub fn check_non_payment_constraint(
    constraint: &Constraint,
    wallet: &WalletState,
    policy_ctx: Option<&PolicyContext<'_>>,
) -> Result<(), GovernanceError> {
    match constraint {
        Constraint::Payment { .. } => Ok(()), // handled by PaymentService
        Constraint::TokenGate {
            required_token,
            min_balance,
            ..
        } => {
            if token_gate::check(required_token, *min_balance, wallet) {
                Ok(())
            } else {
                Err(GovernanceError::AccessDenied)
            }
        }
        Constraint::Policy {
            permissions,
            prohibitions,
            obligations,
        } => {
            let Some(ctx) = policy_ctx else {
                return Err(GovernanceError::AccessDenied);
            };
            if policy::evaluate(permissions, prohibitions, obligations, ctx) {
                Ok(())
            } else {
                Err(GovernanceError::AccessDenied)
            }
        }
        Constraint::Composite { op, terms } => {
            let mut results = terms
                .iter()
                .map(|t| check_non_payment_constraint(t, wallet, policy_ctx));
            match op {
                CompositeOp::And => {
                    results.find(|r| r.is_err()).unwrap_or(Ok(()))
                }
                CompositeOp::Or => {
                    let mut last_err = Err(GovernanceError::AccessDenied);
                    for r in results {
                        if r.is_ok() {
                            return Ok(());
                        }
                        last_err = r;
                    }
                    last_err
                }
            }
        }
    }
}

/// Whether a constraint carries (or contains) a payment term that must be
/// satisfied via the 402 flow before the non-payment checks run.
pub fn has_payment_term(constraint: &Constraint) -> bool {
    payment::payment_terms(constraint).is_some()
}
