//! LoadBalancer Service in front of the site's pods.
//!
//! The node port of each service port is assigned by the cluster on first
//! creation and is never part of the expected shape.

use super::{dependent_meta, selector_labels, service_name};
use crds::Static;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

pub const SERVICE_TYPE: &str = "LoadBalancer";
pub const SERVICE_PORT: i32 = 80;
pub const TARGET_PORT: i32 = 80;

/// Builds the expected Service for `site`.
pub fn build_service(site: &Static) -> Service {
    let site_name = site.name_any();

    Service {
        metadata: dependent_meta(site, service_name(&site_name)),
        spec: Some(ServiceSpec {
            type_: Some(SERVICE_TYPE.to_string()),
            selector: Some(selector_labels(&site_name)),
            ports: Some(vec![ServicePort {
                port: SERVICE_PORT,
                target_port: Some(IntOrString::Int(TARGET_PORT)),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
