//! HorizontalPodAutoscaler dependent. Nothing is mirrored back.

use super::dependent::{Dependent, DependentKind};
use crate::builders::autoscaler::build_autoscaler;
use crate::config::SizingConfig;
use crds::Static;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use serde_json::Value;

pub struct Autoscaler;

impl Dependent for Autoscaler {
    type Object = HorizontalPodAutoscaler;

    const KIND: DependentKind = DependentKind::Autoscaler;

    fn build(site: &Static, sizing: &SizingConfig) -> HorizontalPodAutoscaler {
        build_autoscaler(site, sizing)
    }

    fn owned_fields(object: &HorizontalPodAutoscaler) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&object.spec)
    }
}
