//! Error types

use thiserror::Error;

/// Failures reported by an [`EntityStore`](crate::store::EntityStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },
    #[error("could not decode record: {0}")]
    Decode(String),
}

/// Misuse of the reconciler by its caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("item index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no entity has been observed yet")]
    NotInitialized,
}
