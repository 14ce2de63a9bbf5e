//! Desired-state builders.
//!
//! Pure functions from a Static resource (plus the operator's sizing
//! configuration) to the expected shape of each dependent object. They do
//! no I/O and read nothing but their arguments, so equal inputs always give
//! equal objects.

pub mod autoscaler;
pub mod endpoint;
pub mod workload;

use crds::Static;
use kube::ResourceExt;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Name of the Deployment serving `site_name`.
pub fn deployment_name(site_name: &str) -> String {
    format!("{site_name}-deployment")
}

/// Name of the Service exposing `site_name`.
pub fn service_name(site_name: &str) -> String {
    format!("{site_name}-service")
}

/// Name of the HorizontalPodAutoscaler scaling `site_name`.
pub fn autoscaler_name(site_name: &str) -> String {
    format!("{site_name}-hpa")
}

/// Pod labels, shared by the Deployment selector and the Service selector.
pub fn selector_labels(site_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), deployment_name(site_name))])
}

/// Metadata for a dependent named `name`, in the Static's namespace.
fn dependent_meta(site: &Static, name: String) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: site.namespace(),
        ..Default::default()
    }
}
