use thiserror::Error;

use crate::federation::FederationError;
use crate::governance::GovernanceError;
use crate::identity::IdentityError;
use crate::ld::validate::ValidationError;
use crate::provenance::ProvenanceError;
use crate::store::StoreError;

/// Crate-wide error, the union of every module's own error enum.
///
/// Handlers convert this (or a module error directly) into an
/// [`crate::api::error::ApiError`] at the HTTP boundary; library code never
/// constructs one of these for its own sake, it just `?`s module errors and
/// lets `#[from]` do the folding.
#[derive(Debug, Error)]
pub enum HyprCatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Federation(#[from] FederationError),

    #[error(transparent)]
    Provenance(#[from] ProvenanceError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}
