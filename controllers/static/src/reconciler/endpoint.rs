//! Service dependent: exposes the site, mirrors the load balancer address.
//!
//! Node ports belong to the cluster's allocator. They are carried from the
//! observed Service into the expected one before comparing, and updates are
//! applied on top of the observed object so allocator-owned fields (node
//! ports, cluster IPs) are sent back unchanged.

use super::dependent::{Dependent, DependentKind, StatusChange};
use crate::builders::endpoint::build_service;
use crate::config::SizingConfig;
use crds::{Static, StaticStatus};
use k8s_openapi::api::core::v1::{Service, ServicePort};
use serde_json::Value;

pub struct Endpoint;

/// The observed port matching `port`: same port number, else same position.
fn matching_port<'a>(observed: &'a [ServicePort], port: &ServicePort, index: usize) -> Option<&'a ServicePort> {
    observed
        .iter()
        .find(|p| p.port == port.port)
        .or_else(|| observed.get(index))
}

impl Dependent for Endpoint {
    type Object = Service;

    const KIND: DependentKind = DependentKind::Endpoint;

    fn build(site: &Static, _sizing: &SizingConfig) -> Service {
        build_service(site)
    }

    fn owned_fields(object: &Service) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&object.spec)
    }

    fn carry_forward(expected: &mut Service, observed: &Service) {
        expected
            .metadata
            .resource_version
            .clone_from(&observed.metadata.resource_version);

        let observed_ports = observed
            .spec
            .as_ref()
            .and_then(|s| s.ports.as_deref())
            .unwrap_or_default();
        let Some(ports) = expected.spec.as_mut().and_then(|s| s.ports.as_mut()) else {
            return;
        };
        for (index, port) in ports.iter_mut().enumerate() {
            if let Some(found) = matching_port(observed_ports, port, index) {
                port.node_port = found.node_port;
            }
        }
    }

    fn prepare_update(expected: Service, observed: &Service) -> Service {
        let mut merged = observed.clone();
        merged.metadata.owner_references = expected.metadata.owner_references;
        merged.metadata.resource_version = expected.metadata.resource_version;

        let expected_spec = expected.spec.unwrap_or_default();
        let spec = merged.spec.get_or_insert_with(Default::default);
        spec.type_ = expected_spec.type_;
        spec.selector = expected_spec.selector;
        spec.ports = expected_spec.ports;
        merged
    }

    fn back_sync(observed: &Service, status: &StaticStatus) -> Option<StatusChange> {
        let ingress = observed
            .status
            .as_ref()?
            .load_balancer
            .as_ref()?
            .ingress
            .as_ref()?
            .first()?;
        let address = ingress
            .ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
            .or(ingress.hostname.as_deref())
            .filter(|addr| !addr.is_empty())?;
        (address != status.external_ip).then(|| StatusChange::ExternalAddress(address.to_string()))
    }
}
