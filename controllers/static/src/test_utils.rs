//! Test utilities for unit testing reconcilers
//!
//! Fixtures for Static resources, an event publisher that records what it was
//! asked to publish, and a reconciler wired to the in-memory store.

use crate::config::SizingConfig;
use crate::events::EventPublisher;
use crate::reconciler::Reconciler;
use crate::store::memory::MemoryStore;
use async_trait::async_trait;
use crds::{Static, StaticSpec};
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube_runtime::events::EventType;
use std::sync::{Arc, Mutex};

/// Helper to create a test Static resource
pub fn create_test_static(name: &str, namespace: &str, min_replicas: i32, max_replicas: i32) -> Static {
    Static {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{name}")),
            ..Default::default()
        },
        spec: StaticSpec {
            disk_size: "1Mi".to_string(),
            source: "gs://my-bucket/".to_string(),
            min_replicas,
            max_replicas,
        },
        status: None,
    }
}

/// Event publisher that keeps every published reason.
#[derive(Default)]
pub struct RecordingEvents {
    reasons: Mutex<Vec<String>>,
}

impl RecordingEvents {
    pub fn reasons(&self) -> Vec<String> {
        self.reasons.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEvents {
    async fn publish(
        &self,
        _resource_ref: &ObjectReference,
        _type_: EventType,
        reason: &str,
        _action: &str,
        _note: Option<String>,
    ) {
        self.reasons.lock().unwrap().push(reason.to_string());
    }
}

/// Reconciler over `store` with default sizing, plus its event recorder.
pub fn create_test_reconciler(store: &MemoryStore) -> (Reconciler<MemoryStore>, Arc<RecordingEvents>) {
    let events = Arc::new(RecordingEvents::default());
    let reconciler = Reconciler::new(store.clone(), events.clone(), SizingConfig::default());
    (reconciler, events)
}
