//! Kubernetes Event recording.
//!
//! Informational records about what a reconciliation pass changed, attached
//! to the Static resource so they show up in `kubectl describe static`.
//! Publishing is fire-and-forget: a failed event is logged and never fails
//! the pass.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::Client;
use kube_runtime::events::{Event, EventType, Recorder, Reporter};
use tracing::warn;

/// Publishes Kubernetes Events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an event about `resource_ref`.
    async fn publish(
        &self,
        resource_ref: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: Option<String>,
    );
}

/// Publisher backed by `kube_runtime::events::Recorder`.
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    /// Creates a publisher reporting as `controller_name`, optionally
    /// qualified by the replica `instance` (usually the pod name).
    pub fn new(client: Client, controller_name: &str, instance: Option<String>) -> Self {
        let reporter = Reporter {
            controller: controller_name.to_string(),
            instance,
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(
        &self,
        resource_ref: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: Option<String>,
    ) {
        let event = Event {
            type_,
            reason: reason.to_string(),
            note,
            action: action.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, resource_ref).await {
            warn!("Failed to publish {} event: {}", reason, e);
        }
    }
}

/// Event reason strings, shown under REASON in `kubectl get events`.
pub mod reasons {
    pub const DEPLOYMENT_CREATED: &str = "DeploymentCreated";
    pub const DEPLOYMENT_UPDATED: &str = "DeploymentUpdated";
    pub const SERVICE_CREATED: &str = "ServiceCreated";
    pub const SERVICE_UPDATED: &str = "ServiceUpdated";
    pub const AUTOSCALER_CREATED: &str = "AutoscalerCreated";
    pub const AUTOSCALER_UPDATED: &str = "AutoscalerUpdated";
    pub const REPLICAS_UPDATED: &str = "ReplicasUpdated";
    pub const EXTERNAL_ADDRESS_UPDATED: &str = "ExternalAddressUpdated";
}

/// Event action strings.
pub mod actions {
    pub const CREATE: &str = "Create";
    pub const UPDATE: &str = "Update";
    pub const SYNC_STATUS: &str = "SyncStatus";
}
