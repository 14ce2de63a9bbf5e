//! Controller-specific error types.
//!
//! Every variant is a hard error: it aborts the current reconciliation pass
//! and is handed back to the trigger, which owns retry and backoff.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur in the Static Website Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Resource store failure (network, timeout, conflict, ...)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Owner reference could not be derived from the Static resource
    #[error("Owner reference error: {0}")]
    OwnerReference(String),

    /// Declared spec violates an invariant the dependents rely on
    #[error("Invalid Static spec: {0}")]
    InvalidSpec(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Object is missing a required metadata field
    #[error("Missing object key: {0}")]
    MissingObjectKey(&'static str),

    /// Object could not be converted for comparison
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Kubernetes client setup failed
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),
}
