//! HorizontalPodAutoscaler scaling the site's Deployment.

use super::{autoscaler_name, dependent_meta, deployment_name};
use crate::config::SizingConfig;
use crds::Static;
use k8s_openapi::api::autoscaling::v1::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
};
use kube::ResourceExt;

/// Builds the expected HorizontalPodAutoscaler for `site`.
pub fn build_autoscaler(site: &Static, sizing: &SizingConfig) -> HorizontalPodAutoscaler {
    let site_name = site.name_any();

    HorizontalPodAutoscaler {
        metadata: dependent_meta(site, autoscaler_name(&site_name)),
        spec: Some(HorizontalPodAutoscalerSpec {
            min_replicas: Some(site.spec.min_replicas),
            max_replicas: site.spec.max_replicas,
            target_cpu_utilization_percentage: Some(sizing.cpu_utilization),
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some("apps/v1".to_string()),
                kind: "Deployment".to_string(),
                name: deployment_name(&site_name),
            },
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_static;

    #[test]
    fn test_replica_bounds_copied() {
        let site = create_test_static("my-static", "my-ns", 2, 4);
        let hpa = build_autoscaler(&site, &SizingConfig::default());

        assert_eq!(hpa.metadata.name.as_deref(), Some("my-static-hpa"));
        let spec = hpa.spec.unwrap();
        assert_eq!(spec.min_replicas, Some(2));
        assert_eq!(spec.max_replicas, 4);
        assert_eq!(spec.target_cpu_utilization_percentage, Some(400));
    }

    #[test]
    fn test_targets_derived_deployment() {
        let site = create_test_static("my-static", "my-ns", 1, 3);
        let target = build_autoscaler(&site, &SizingConfig::default())
            .spec
            .unwrap()
            .scale_target_ref;

        assert_eq!(target.kind, "Deployment");
        assert_eq!(target.api_version.as_deref(), Some("apps/v1"));
        assert_eq!(target.name, "my-static-deployment");
    }
}
