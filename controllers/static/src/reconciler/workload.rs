//! Deployment dependent: serves the content, mirrors its replica count.
//!
//! The replica count belongs to the autoscaler. Updates are applied on top of
//! the observed Deployment and only replace the selector, strategy and pod
//! template, so `spec.replicas` and metadata added by other actors survive.

use super::dependent::{Dependent, DependentKind, StatusChange};
use crate::builders::workload::build_deployment;
use crate::config::SizingConfig;
use crds::{Static, StaticStatus};
use k8s_openapi::api::apps::v1::Deployment;
use serde_json::Value;

pub struct Workload;

impl Dependent for Workload {
    type Object = Deployment;

    const KIND: DependentKind = DependentKind::Workload;

    fn build(site: &Static, sizing: &SizingConfig) -> Deployment {
        build_deployment(site, sizing)
    }

    fn owned_fields(object: &Deployment) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&object.spec)
    }

    fn prepare_update(expected: Deployment, observed: &Deployment) -> Deployment {
        let mut merged = observed.clone();
        merged.metadata.owner_references = expected.metadata.owner_references;
        merged.metadata.resource_version = expected.metadata.resource_version;

        if let Some(expected_spec) = expected.spec {
            let spec = merged.spec.get_or_insert_with(Default::default);
            spec.selector = expected_spec.selector;
            spec.strategy = expected_spec.strategy;
            spec.template = expected_spec.template;
        }
        merged
    }

    fn back_sync(observed: &Deployment, status: &StaticStatus) -> Option<StatusChange> {
        let replicas = observed
            .status
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or_default();
        (replicas != status.replicas).then_some(StatusChange::Replicas(replicas))
    }
}
