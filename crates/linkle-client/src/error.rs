use linkle_shared::{ListingId, ValidationError};
use linkle_store::StoreError;
use thiserror::Error;

/// Errors surfaced by [`AppState`](crate::AppState) operations that report
/// failure to the caller.  Read paths never return these; they log and
/// degrade instead.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Form input the caller should show inline.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// A settings patch or snapshot document was malformed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
