//! Deployment serving the site content.
//!
//! An init container copies the content from object storage into an
//! `emptyDir` volume sized to the Static's disk size; nginx then serves that
//! volume read-only. Replica count is left unset: the autoscaler owns it.

use super::{deployment_name, dependent_meta, selector_labels};
use crate::config::SizingConfig;
use crds::Static;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EmptyDirVolumeSource, EnvVar, PodSpec, PodTemplateSpec,
    ResourceRequirements, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::ResourceExt;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

pub const VOLUME_NAME: &str = "static-files";
pub const INIT_CONTAINER_NAME: &str = "copy-static-files";
pub const INIT_IMAGE: &str = "gcr.io/cloud-builders/gcloud";
pub const STAGING_PATH: &str = "/mnt";
pub const SERVING_CONTAINER_NAME: &str = "website";
pub const SERVING_IMAGE: &str = "nginx";
pub const SERVING_PATH: &str = "/usr/share/nginx/html";
pub const SERVING_PORT: i32 = 80;
pub const ROLLING_UPDATE: &str = "RollingUpdate";

/// Builds the expected Deployment for `site`.
pub fn build_deployment(site: &Static, sizing: &SizingConfig) -> Deployment {
    let site_name = site.name_any();
    let labels = selector_labels(&site_name);

    Deployment {
        metadata: dependent_meta(site, deployment_name(&site_name)),
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            strategy: Some(DeploymentStrategy {
                type_: Some(ROLLING_UPDATE.to_string()),
                ..Default::default()
            }),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    volumes: Some(vec![Volume {
                        name: VOLUME_NAME.to_string(),
                        empty_dir: Some(EmptyDirVolumeSource {
                            size_limit: Some(Quantity(site.spec.disk_size.clone())),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    init_containers: Some(vec![staging_container(&site.spec.source)]),
                    containers: vec![serving_container(sizing)],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn staging_container(source: &str) -> Container {
    Container {
        name: INIT_CONTAINER_NAME.to_string(),
        image: Some(INIT_IMAGE.to_string()),
        command: Some(vec![
            "bash".to_string(),
            "-c".to_string(),
            format!("gsutil cp -R $(SOURCE)/* {STAGING_PATH}/"),
        ]),
        env: Some(vec![EnvVar {
            name: "SOURCE".to_string(),
            value: Some(source.to_string()),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: VOLUME_NAME.to_string(),
            mount_path: STAGING_PATH.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn serving_container(sizing: &SizingConfig) -> Container {
    Container {
        name: SERVING_CONTAINER_NAME.to_string(),
        image: Some(SERVING_IMAGE.to_string()),
        resources: Some(ResourceRequirements {
            requests: Some(resource_list(sizing.memory_request_mi, sizing.cpu_request_milli)),
            limits: Some(resource_list(sizing.memory_limit_mi, sizing.cpu_limit_milli)),
            ..Default::default()
        }),
        ports: Some(vec![ContainerPort {
            container_port: SERVING_PORT,
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: VOLUME_NAME.to_string(),
            mount_path: SERVING_PATH.to_string(),
            read_only: Some(true),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn resource_list(memory_mi: i64, cpu_milli: i64) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("memory".to_string(), Quantity(format!("{memory_mi}Mi"))),
        ("cpu".to_string(), Quantity(format!("{cpu_milli}m"))),
    ])
}
