//! The 402-payment flow (spec.md §4.F #1): invoice issuance, proof
//! verification, wallet debit. Grounded in the pack's x402 middleware
//! crates (`examples/other_examples/*x402*layer.rs`), the closest real
//! analogue to this flow in the entire example pack.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ld::Constraint;
use crate::wallet::{WalletError, WalletStore};

use super::GovernanceError;

/// Minimum accepted proof length (spec.md §4.F, fixed per the concrete
/// scenario in spec.md §8.2 — a 32-character proof succeeds).
const MIN_PROOF_LENGTH: usize = 32;
const INVOICE_TTL_SECS: i64 = 10 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInvoice {
    pub invoice_id: String,
    pub amount: u64,
    pub currency: String,
    pub recipient: String,
    pub bolt11: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub payment_header: &'static str,
    pub invoice_header: &'static str,
}

impl PaymentInvoice {
    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub id: String,
    pub invoice_id: String,
    pub payer_did: String,
    pub amount: u64,
    pub currency: String,
    pub proof: String,
    pub status: ReceiptStatus,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied proof of payment: either an invoice id plus proof
/// string (normal flow) or a direct proof with no invoice reference
/// (`invoiceId = "direct"`, spec.md §3 "Payment receipt").
pub struct PaymentAttempt<'a> {
    pub invoice_id: Option<&'a str>,
    pub proof: &'a str,
    pub payer_did: &'a str,
}

#[derive(Default)]
pub struct PaymentService {
    invoices: DashMap<String, PaymentInvoice>,
    receipts: DashMap<String, PaymentReceipt>,
}

impl PaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh invoice from a payment constraint (spec.md §4.F #1).
    pub fn issue_invoice(&self, amount: u64, currency: &str, recipient: &str) -> PaymentInvoice {
        let invoice_id = format!("urn:uuid:{}", Uuid::new_v4());
        let issued_at = Utc::now();
        let invoice = PaymentInvoice {
            invoice_id: invoice_id.clone(),
            amount,
            currency: currency.to_string(),
            recipient: recipient.to_string(),
            bolt11: format!("lnbc{amount}sim1{}", Uuid::new_v4().simple()),
            issued_at,
            expires_at: issued_at + Duration::seconds(INVOICE_TTL_SECS),
            payment_header: "X-Payment-Proof",
            invoice_header: "X-Payment-Invoice",
        };
        self.invoices.insert(invoice_id, invoice.clone());
        invoice
    }

    /// Verifies a payment proof against its invoice, debits the payer's
    /// wallet, and emits the authoritative receipt (spec.md §4.F #1).
    /// A failed attempt discards the invoice — the caller must re-issue.
    pub fn settle(
        &self,
        attempt: PaymentAttempt<'_>,
        wallets: &WalletStore,
    ) -> Result<PaymentReceipt, GovernanceError> {
        if attempt.proof.len() < MIN_PROOF_LENGTH {
            if let Some(id) = attempt.invoice_id {
                self.invoices.remove(id);
            }
            return Err(GovernanceError::InvalidProof);
        }

        let (invoice_id, amount, currency) = match attempt.invoice_id {
            Some(id) => {
                let invoice = self
                    .invoices
                    .remove(id)
                    .map(|(_, v)| v)
                    .ok_or(GovernanceError::UnknownInvoice)?;
                if invoice.is_expired() {
                    return Err(GovernanceError::InvoiceExpired);
                }
                (invoice.invoice_id, invoice.amount, invoice.currency)
            }
            None => ("direct".to_string(), 0, "SAT".to_string()),
        };

        wallets
            .debit(attempt.payer_did, &currency, amount)
            .map_err(|e| match e {
                WalletError::InsufficientFunds => GovernanceError::InsufficientFunds,
            })?;

        let receipt = PaymentReceipt {
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            invoice_id,
            payer_did: attempt.payer_did.to_string(),
            amount,
            currency,
            proof: attempt.proof.to_string(),
            status: ReceiptStatus::Confirmed,
            created_at: Utc::now(),
        };
        self.receipts.insert(receipt.id.clone(), receipt.clone());
        Ok(receipt)
    }

    pub fn invoice(&self, id: &str) -> Option<PaymentInvoice> {
        self.invoices.get(id).map(|v| v.clone())
    }

    pub fn receipt(&self, id: &str) -> Option<PaymentReceipt> {
        self.receipts.get(id).map(|v| v.clone())
    }
}

/// Extracts `{amount, currency, recipient}` from a payment constraint, if
/// the given constraint is (or contains) one.
pub fn payment_terms(constraint: &Constraint) -> Option<(u64, &str, &str)> {
    match constraint {
        Constraint::Payment {
            amount,
            currency,
            recipient,
        } => Some((*amount, currency.as_str(), recipient.as_str())),
        Constraint::Composite { terms, .. } => terms.iter().find_map(payment_terms),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_proof_is_rejected_and_invoice_discarded() {
        let svc = PaymentService::new();
        let wallets = WalletStore::new();
        wallets.ensure("did:payer");
        let invoice = svc.issue_invoice(100, "SAT", "did:recipient");

        let err = svc.settle(
            PaymentAttempt {
                invoice_id: Some(&invoice.invoice_id),
                proof: "too-short",
                payer_did: "did:payer",
            },
            &wallets,
        );
        assert!(matches!(err, Err(GovernanceError::InvalidProof)));
        assert!(svc.invoice(&invoice.invoice_id).is_none());
    }

    #[test]
    fn successful_payment_debits_exact_amount() {
        let svc = PaymentService::new();
        let wallets = WalletStore::new();
        wallets.ensure("did:payer");
        let invoice = svc.issue_invoice(100, "SAT", "did:recipient");

        let receipt = svc
            .settle(
                PaymentAttempt {
                    invoice_id: Some(&invoice.invoice_id),
                    proof: &"x".repeat(32),
                    payer_did: "did:payer",
                },
                &wallets,
            )
            .unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Confirmed);
        assert_eq!(
            wallets.get("did:payer").unwrap().balance("SAT"),
            10_000 - 100
        );
    }

    #[test]
    fn unknown_invoice_is_rejected() {
        let svc = PaymentService::new();
        let wallets = WalletStore::new();
        let err = svc.settle(
            PaymentAttempt {
                invoice_id: Some("urn:uuid:does-not-exist"),
                proof: &"x".repeat(32),
                payer_did: "did:payer",
            },
            &wallets,
        );
        assert!(matches!(err, Err(GovernanceError::UnknownInvoice)));
    }

    #[test]
    fn insufficient_funds_is_rejected() {
        let svc = PaymentService::new();
        let wallets = WalletStore::new();
        wallets.ensure("did:payer");
        let invoice = svc.issue_invoice(100_000, "SAT", "did:recipient");
        let err = svc.settle(
            PaymentAttempt {
                invoice_id: Some(&invoice.invoice_id),
                proof: &"x".repeat(32),
                payer_did: "did:payer",
            },
            &wallets,
        );
        assert!(matches!(err, Err(GovernanceError::InsufficientFunds)));
    }
}
