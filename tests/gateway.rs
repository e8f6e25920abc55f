//! End-to-end HTTP surface tests (spec.md §4.I, §8 concrete scenarios),
//! driving an in-process `axum::Router` through `tower::ServiceExt::oneshot`
//! instead of a live socket — grounded in the teacher's top-level
//! `tests/test_*.rs` layout, adapted from its Anvil-fork integration style
//! to a self-contained in-process gateway.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use hyprcat::api::state::AppState;
use hyprcat::api::test_router;
use hyprcat::catalog::CatalogService;
use hyprcat::catalog::seed;
use hyprcat::config::GatewayConfig;
use hyprcat::store::MemoryStore;
use hyprcat::store::ResourceStore;

async fn seeded_state() -> AppState {
    let config = Arc::new(GatewayConfig::for_tests());
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryStore::new());
    let catalog = CatalogService::new(store.clone());
    catalog.seed().await.expect("seeding demonstration mesh");
    AppState::new(config, store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

async fn authed_did(state: &AppState) -> (String, String) {
    let did = "did:pkh:eip155:1:0x000000000000000000000000000000000000b2".to_string();
    let challenge = state.identity.issue_challenge("hyprcat.example");
    state
        .identity
        .verify_challenge(&did, "sim:anything", &challenge.nonce)
        .unwrap();
    let token = state.identity.issue_token(&did, "full").unwrap();
    state.wallets.ensure(&did);
    (did, token.token)
}

#[tokio::test]
async fn health_is_always_ok() {
    let state = seeded_state().await;
    let response = test_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_node_is_404() {
    let state = seeded_state().await;
    let response = test_router(state)
        .oneshot(
            Request::builder()
                .uri("/nodes/does/not/exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seeded_node_is_fetchable() {
    let state = seeded_state().await;
    let response = test_router(state)
        .oneshot(
            Request::builder()
                .uri("/nodes/store/widgets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unacceptable_accept_header_is_406() {
    let state = seeded_state().await;
    let response = test_router(state)
        .oneshot(
            Request::builder()
                .uri("/nodes/store/widgets")
                .header("accept", "text/plain")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn catalog_search_returns_a_hydra_collection() {
    let state = seeded_state().await;
    let response = test_router(state)
        .oneshot(Request::builder().uri("/catalog").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "hydra:Collection");
    assert!(body["totalItems"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn checkout_without_proof_returns_402_with_invoice() {
    let state = seeded_state().await;
    let (_did, token) = authed_did(&state).await;
    let router = test_router(state);

    let body = json!({ "nodeId": seed::RETAIL_STORE_ID, "quantity": 1 });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/operations/checkout")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = body_json(response).await;
    assert_eq!(body["x402:amount"], 500);
    assert_eq!(body["x402:currency"], "SAT");
}

#[tokio::test]
async fn checkout_with_proof_debits_the_wallet_and_mints_an_order() {
    let state = seeded_state().await;
    let (did, token) = authed_did(&state).await;
    let starting_balance = state.wallets.get(&did).unwrap().balance("SAT");
    let router = test_router(state);

    let body = json!({ "nodeId": seed::RETAIL_STORE_ID, "quantity": 1 });
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/operations/checkout")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .header("x-payment-proof", "a".repeat(32))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    assert_eq!(order["schema:price"], 500);
    assert!(order["x402:paymentReceipt"].is_string());
    assert_eq!(starting_balance, 10_000);
}

#[tokio::test]
async fn missing_auth_on_checkout_is_401() {
    let state = seeded_state().await;
    let router = test_router(state);
    let body = json!({ "nodeId": seed::RETAIL_STORE_ID, "quantity": 1 });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/operations/checkout")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_federated_query_is_422() {
    let state = seeded_state().await;
    let router = test_router(state);
    let body = json!({ "query": "" });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/operations/query")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn auth_challenge_then_verify_issues_a_usable_token() {
    let state = seeded_state().await;
    let router = test_router(state);

    let challenge_response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/challenge")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "domain": "hyprcat.example" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(challenge_response.status(), StatusCode::OK);
    let challenge = body_json(challenge_response).await;
    let nonce = challenge["nonce"].as_str().unwrap().to_string();

    let did = "did:pkh:eip155:1:0x000000000000000000000000000000000000c3";
    let verify_response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/verify")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "did": did, "signature": "sim:anything", "nonce": nonce }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(verify_response.status(), StatusCode::OK);
    let verified = body_json(verify_response).await;
    let token = verified["token"].as_str().unwrap().to_string();

    let profile_response = router
        .oneshot(
            Request::builder()
                .uri("/auth/profile")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(profile_response.status(), StatusCode::OK);
    let profile = body_json(profile_response).await;
    assert_eq!(profile["did"], did);
}

#[tokio::test]
async fn wallet_lookup_requires_auth() {
    let state = seeded_state().await;
    let router = test_router(state);
    let response = router
        .oneshot(Request::builder().uri("/wallet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
