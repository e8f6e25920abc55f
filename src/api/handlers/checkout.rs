//! `POST /operations/checkout` (spec.md §4.F #1, §8 scenario 2): the
//! canonical 402-payment round trip — no proof yields an invoice, a
//! sufficient proof debits the payer and mints an order.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::governance::payment::{self, PaymentAttempt};
use crate::ld::{HttpMethod, Resource};

fn default_quantity() -> u64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u64,
}

pub async fn checkout(
    auth: AuthUser,
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let node = state
        .store
        .get(&req.node_id)
        .await?
        .ok_or_else(|| ApiError::InvalidRequest(format!("unknown node {}", req.node_id)))?;

    let op = node
        .operation
        .iter()
        .flatten()
        .find(|op| op.method == HttpMethod::Post)
        .ok_or_else(|| ApiError::InvalidRequest("node has no purchase affordance".into()))?;

    let constraint = op
        .constraint
        .as_ref()
        .ok_or_else(|| ApiError::InvalidRequest("affordance carries no payment constraint".into()))?;
    let (unit_amount, currency, recipient) = payment::payment_terms(constraint)
        .ok_or_else(|| ApiError::InvalidRequest("affordance is not a paid operation".into()))?;
    let quantity = req.quantity.max(1);
    let amount = unit_amount * quantity;

    let proof = match headers.get("x-payment-proof").and_then(|v| v.to_str().ok()) {
        Some(proof) => proof,
        None => {
            let invoice = state.payments.issue_invoice(amount, currency, recipient);
            return Err(ApiError::PaymentRequired(Box::new(invoice)));
        }
    };
    let invoice_id = headers.get("x-payment-invoice").and_then(|v| v.to_str().ok());

    let receipt = state.payments.settle(
        PaymentAttempt {
            invoice_id,
            proof,
            payer_did: &auth.did,
        },
        &state.wallets,
    )?;

    let order = Resource::new(format!("urn:uuid:{}", Uuid::new_v4()), vec!["schema:Order".into()])
        .with_context()
        .with_property("schema:orderedItem", json!(req.node_id))
        .with_property("schema:price", json!(amount))
        .with_property("x402:paymentReceipt", json!(receipt.id));

    let chain_id = state
        .provenance
        .start_chain(&auth.did, "checkout", serde_json::to_value(&node).unwrap_or_default());
    state
        .provenance
        .with_chain_mut(&auth.did, &chain_id, |chain| {
            chain.append_activity(
                "BuyAction",
                "checkout",
                Some(json!({ "nodeId": req.node_id, "quantity": quantity })),
                Some("checkout".to_string()),
                Some("POST".to_string()),
                Some(req.node_id.clone()),
                Some(201),
                None,
            )
        })
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::Internal("failed to record purchase activity".into()))?;

    Ok((StatusCode::CREATED, Json(order)))
}
