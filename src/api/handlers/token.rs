//! `/operations/token/*` (spec.md §4.E, §4.F): minting is a paid
//! operation gated by the same 402 flow as checkout; burning refunds a
//! fraction of the mint price back to the holder's wallet.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::governance::payment::PaymentAttempt;
use crate::wallet::WalletError;

/// Fixed SAT price per minted unit (no seed resource models token
/// issuance directly, unlike checkout's product-carried price).
const PRICE_PER_UNIT: u64 = 10;
/// Burn refunds at half the mint price, the usual discount for reversing
/// an issuance rather than a fresh purchase.
const REFUND_PER_UNIT: u64 = PRICE_PER_UNIT / 2;

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub token: String,
    pub amount: u64,
}

pub async fn mint(
    auth: AuthUser,
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<MintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.amount == 0 {
        return Err(ApiError::InvalidRequest("amount must be positive".into()));
    }
    let price = PRICE_PER_UNIT * req.amount;

    let proof = match headers.get("x-payment-proof").and_then(|v| v.to_str().ok()) {
        Some(proof) => proof,
        None => {
            let invoice = state.payments.issue_invoice(price, "SAT", "did:hyprcat:treasury");
            return Err(ApiError::PaymentRequired(Box::new(invoice)));
        }
    };
    let invoice_id = headers.get("x-payment-invoice").and_then(|v| v.to_str().ok());

    state.payments.settle(
        PaymentAttempt {
            invoice_id,
            proof,
            payer_did: &auth.did,
        },
        &state.wallets,
    )?;

    let balance = state.wallets.grant_token(&auth.did, &req.token, req.amount);

    let chain_id = state.provenance.start_chain(
        &auth.did,
        "token-mint",
        json!({ "token": req.token, "amount": req.amount }),
    );
    state
        .provenance
        .with_chain_mut(&auth.did, &chain_id, |chain| {
            chain.append_activity(
                "MintAction",
                "token-mint",
                Some(json!({ "token": req.token, "amount": req.amount })),
                None,
                Some("POST".to_string()),
                Some("/operations/token/mint".to_string()),
                Some(201),
                None,
            )
        })
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::Internal("failed to record mint activity".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "type": "hyprcat:TokenGrant",
            "token": req.token,
            "minted": req.amount,
            "balance": balance,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct BurnRequest {
    pub token: String,
    pub amount: u64,
}

pub async fn burn(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BurnRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let balance = state.wallets.burn_token(&auth.did, &req.token, req.amount).map_err(|e| match e {
        WalletError::InsufficientFunds => ApiError::InvalidRequest("insufficient token balance to burn".into()),
    })?;
    let refund = REFUND_PER_UNIT * req.amount;
    let sat_balance = state.wallets.credit(&auth.did, "SAT", refund);

    let chain_id = state.provenance.start_chain(
        &auth.did,
        "token-burn",
        json!({ "token": req.token, "amount": req.amount }),
    );
    state
        .provenance
        .with_chain_mut(&auth.did, &chain_id, |chain| {
            chain.append_activity(
                "BurnAction",
                "token-burn",
                Some(json!({ "token": req.token, "amount": req.amount, "refund": refund })),
                None,
                Some("DELETE".to_string()),
                Some("/operations/token/burn".to_string()),
                Some(200),
                None,
            )
        })
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::Internal("failed to record burn activity".into()))?;

    Ok(Json(json!({
        "type": "hyprcat:TokenBurn",
        "token": req.token,
        "burned": req.amount,
        "tokenBalance": balance,
        "refunded": refund,
        "satBalance": sat_balance,
    })))
}
