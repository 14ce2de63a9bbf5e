//! Static CRD
//!
//! Declares a static website: where its content lives, how much disk each
//! instance reserves for it, and the bounds the autoscaler works within.

use crate::quantity::parse_quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "website.example.com",
    version = "v1alpha1",
    kind = "Static",
    plural = "statics",
    namespaced,
    status = "StaticStatus",
    printcolumn = r#"{"name":"Replicas", "type":"integer", "jsonPath":".status.replicas"}"#,
    printcolumn = r#"{"name":"External IP", "type":"string", "jsonPath":".status.externalIP"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct StaticSpec {
    /// Disk space reserved on each instance for the served assets (e.g. `512Mi`)
    pub disk_size: String,

    /// Location of the assets to serve, in the form `gs://bucket-name/path`
    pub source: String,

    /// Minimal number of instances
    #[schemars(range(min = 1))]
    pub min_replicas: i32,

    /// Maximal number of instances
    #[schemars(range(min = 1))]
    pub max_replicas: i32,
}

/// Observed state of a Static website, mirrored from its dependents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub struct StaticStatus {
    /// Replica count last reported by the Deployment
    #[serde(default)]
    pub replicas: i32,

    /// External address of the load balancer, empty until one is assigned
    #[serde(default, rename = "externalIP")]
    pub external_ip: String,
}

/// Reasons a `StaticSpec` cannot be turned into dependents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("diskSize {0:?} is not a valid quantity")]
    InvalidDiskSize(String),

    #[error("diskSize must be greater than zero")]
    EmptyDiskSize,

    #[error("source must not be empty")]
    MissingSource,

    #[error("minReplicas must be at least 1, got {0}")]
    MinReplicasTooLow(i32),

    #[error("minReplicas ({min}) must not exceed maxReplicas ({max})")]
    ReplicaBoundsInverted { min: i32, max: i32 },
}

impl StaticSpec {
    /// Checks the invariants the dependents rely on.
    pub fn validate(&self) -> Result<(), SpecError> {
        let bytes = parse_quantity(&self.disk_size)
            .ok_or_else(|| SpecError::InvalidDiskSize(self.disk_size.clone()))?;
        if bytes <= 0.0 {
            return Err(SpecError::EmptyDiskSize);
        }
        if self.source.trim().is_empty() {
            return Err(SpecError::MissingSource);
        }
        if self.min_replicas < 1 {
            return Err(SpecError::MinReplicasTooLow(self.min_replicas));
        }
        if self.min_replicas > self.max_replicas {
            return Err(SpecError::ReplicaBoundsInverted {
                min: self.min_replicas,
                max: self.max_replicas,
            });
        }
        Ok(())
    }
}

impl Static {
    /// Current status, or the zero status if none has been written yet.
    pub fn status_or_default(&self) -> StaticStatus {
        self.status.clone().unwrap_or_default()
    }
}
