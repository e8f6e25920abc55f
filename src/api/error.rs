//! Error envelope (spec.md §6 "Error envelope", §7 taxonomy): every
//! handler failure becomes one JSON-LD shaped body with
//! `{type, id, statusCode, title, detail, instance}`, grounded in the
//! teacher's `ApiError` enum + `IntoResponse` pattern
//! (`examples/omo-protocol-defi-flow/src/api/error.rs`), generalized from
//! a flat `{error}` body to the spec's richer envelope and its 13 kinds.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::federation::FederationError;
use crate::governance::{GovernanceError, PaymentInvoice};
use crate::identity::IdentityError;
use crate::ld::validate::ValidationError;
use crate::provenance::ProvenanceError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    AuthenticationRequired(String),
    AuthenticationFailed(String),
    PaymentRequired(Box<PaymentInvoice>),
    AccessDenied(String),
    NotFound(String),
    MethodNotAllowed(String),
    Conflict(String),
    ValidationError(Vec<String>),
    RateLimited { retry_after: u64 },
    Internal(String),
    FederationError(String),
    ServiceUnavailable(String),
    /// Content negotiation failure (spec.md §4.I "Content negotiation").
    /// Not part of the §7 kind taxonomy — it's rejected ahead of routing,
    /// before any handler-level error kind would apply.
    NotAcceptable(String),
}

/// `{type, id, statusCode, title, detail, instance}` (spec.md §6). `id` is
/// a fresh URN per response, matching the shape of every other identifier
/// this crate mints; `instance` is left `null` since handlers don't thread
/// a request id through the middleware stack yet.
fn envelope(kind: &str, status: StatusCode, title: &str, detail: &str) -> Value {
    json!({
        "type": format!("https://hyprcat.example/errors/{kind}"),
        "id": format!("urn:uuid:{}", Uuid::new_v4()),
        "statusCode": status.as_u16(),
        "title": title,
        "detail": detail,
        "instance": Value::Null,
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(envelope("invalid-request", StatusCode::BAD_REQUEST, "Invalid request", &detail)),
            )
                .into_response(),
            ApiError::AuthenticationRequired(detail) => {
                let mut body = envelope(
                    "authentication-required",
                    StatusCode::UNAUTHORIZED,
                    "Authentication required",
                    &detail,
                );
                body["challenge"] = json!("/auth/challenge");
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            ApiError::AuthenticationFailed(detail) => (
                StatusCode::UNAUTHORIZED,
                Json(envelope(
                    "authentication-failed",
                    StatusCode::UNAUTHORIZED,
                    "Authentication failed",
                    &detail,
                )),
            )
                .into_response(),
            ApiError::PaymentRequired(invoice) => {
                let mut body = envelope(
                    "payment-required",
                    StatusCode::PAYMENT_REQUIRED,
                    "Payment required",
                    "attach a payment proof referencing this invoice and retry",
                );
                body["x402:invoiceId"] = json!(invoice.invoice_id);
                body["x402:amount"] = json!(invoice.amount);
                body["x402:currency"] = json!(invoice.currency);
                body["x402:recipient"] = json!(invoice.recipient);
                body["x402:bolt11"] = json!(invoice.bolt11);
                body["x402:expiresAt"] = json!(invoice.expires_at);
                (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
            }
            ApiError::AccessDenied(detail) => (
                StatusCode::FORBIDDEN,
                Json(envelope("access-denied", StatusCode::FORBIDDEN, "Access denied", &detail)),
            )
                .into_response(),
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                Json(envelope("not-found", StatusCode::NOT_FOUND, "Not found", &detail)),
            )
                .into_response(),
            ApiError::MethodNotAllowed(detail) => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(envelope(
                    "method-not-allowed",
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Method not allowed",
                    &detail,
                )),
            )
                .into_response(),
            ApiError::Conflict(detail) => (
                StatusCode::CONFLICT,
                Json(envelope("conflict", StatusCode::CONFLICT, "Conflict", &detail)),
            )
                .into_response(),
            ApiError::ValidationError(paths) => {
                let mut body = envelope(
                    "validation-error",
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Validation error",
                    "one or more properties failed shape validation",
                );
                body["paths"] = json!(paths);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiError::RateLimited { retry_after } => {
                let body = envelope(
                    "rate-limited",
                    StatusCode::TOO_MANY_REQUESTS,
                    "Rate limited",
                    &format!("retry after {retry_after}s"),
                );
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("Retry-After", retry_after.to_string())],
                    Json(body),
                )
                    .into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(envelope(
                        "internal-error",
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal error",
                        "an unexpected error occurred",
                    )),
                )
                    .into_response()
            }
            ApiError::FederationError(detail) => (
                StatusCode::BAD_GATEWAY,
                Json(envelope("federation-error", StatusCode::BAD_GATEWAY, "Federation error", &detail)),
            )
                .into_response(),
            ApiError::ServiceUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(envelope(
                    "service-unavailable",
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service unavailable",
                    &detail,
                )),
            )
                .into_response(),
            ApiError::NotAcceptable(detail) => (
                StatusCode::NOT_ACCEPTABLE,
                Json(envelope("not-acceptable", StatusCode::NOT_ACCEPTABLE, "Not acceptable", &detail)),
            )
                .into_response(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::ValidationError(vec![err.to_string()])
    }
}

impl From<crate::catalog::CatalogError> for ApiError {
    fn from(err: crate::catalog::CatalogError) -> Self {
        match err {
            crate::catalog::CatalogError::InvalidRequest(e) => ApiError::ValidationError(vec![e.to_string()]),
            crate::catalog::CatalogError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UnknownChallenge | IdentityError::ChallengeExpired | IdentityError::SignatureInvalid => {
                ApiError::AuthenticationFailed(err.to_string())
            }
            IdentityError::TokenInvalid => ApiError::AuthenticationRequired(err.to_string()),
        }
    }
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::PaymentRequired => ApiError::InvalidRequest(err.to_string()),
            GovernanceError::UnknownInvoice | GovernanceError::InvoiceExpired | GovernanceError::InvalidProof => {
                ApiError::InvalidRequest(err.to_string())
            }
            GovernanceError::InsufficientFunds => ApiError::InvalidRequest(err.to_string()),
            GovernanceError::AccessDenied => ApiError::AccessDenied(err.to_string()),
        }
    }
}

impl From<FederationError> for ApiError {
    fn from(err: FederationError) -> Self {
        ApiError::FederationError(err.to_string())
    }
}

impl From<ProvenanceError> for ApiError {
    fn from(err: ProvenanceError) -> Self {
        match err {
            ProvenanceError::UnknownChain => ApiError::NotFound(err.to_string()),
            ProvenanceError::NoCurrentEntity | ProvenanceError::Sealed => ApiError::Conflict(err.to_string()),
        }
    }
}
