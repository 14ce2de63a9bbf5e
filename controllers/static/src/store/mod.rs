//! Resource store abstraction.
//!
//! The reconcilers only need get/create/update by name plus a status-only
//! update on the Static resource. These traits abstract the Kubernetes API
//! so the reconcilers can run against an in-memory store in unit tests.
//! Not-found is not an error: `get` returns `Ok(None)`.

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use crds::Static;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use thiserror::Error;

/// Errors returned by a resource store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API error (network, timeout, conflict, forbidden, ...)
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Object could not be encoded for the request
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Object cannot be addressed (missing namespace or name)
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// Store rejected the write because the object changed underneath it
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store is temporarily unable to serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Get/create/update access to one kind of namespaced object.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Fetches an object by namespace and name; `Ok(None)` when absent.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError>;

    /// Creates a new object.
    async fn create(&self, object: &K) -> Result<K, StoreError>;

    /// Replaces an existing object.
    async fn update(&self, object: &K) -> Result<K, StoreError>;
}

/// Status-only updates through the status subresource.
#[async_trait]
pub trait StatusStore<K>: ObjectStore<K>
where
    K: Send + Sync + 'static,
{
    /// Writes `object.status`, leaving metadata and spec untouched.
    async fn update_status(&self, object: &K) -> Result<K, StoreError>;
}

/// Everything the Static reconcilers read and write.
pub trait ResourceStore:
    StatusStore<Static>
    + ObjectStore<Deployment>
    + ObjectStore<Service>
    + ObjectStore<HorizontalPodAutoscaler>
{
}

impl<T> ResourceStore for T where
    T: StatusStore<Static>
        + ObjectStore<Deployment>
        + ObjectStore<Service>
        + ObjectStore<HorizontalPodAutoscaler>
{
}

/// Namespace and name of an object about to be written.
pub(crate) fn object_key<K: Resource>(object: &K) -> Result<(String, String), StoreError> {
    let namespace = object
        .meta()
        .namespace
        .clone()
        .ok_or_else(|| StoreError::InvalidObject(format!("{} has no namespace", object.name_any())))?;
    let name = object
        .meta()
        .name
        .clone()
        .ok_or_else(|| StoreError::InvalidObject("object has no name".to_string()))?;
    Ok((namespace, name))
}

/// Resource store backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    /// Creates a store using the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError> {
        Ok(self.api::<K>(namespace).get_opt(name).await?)
    }

    async fn create(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, _) = object_key(object)?;
        Ok(self
            .api::<K>(&namespace)
            .create(&PostParams::default(), object)
            .await?)
    }

    async fn update(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        Ok(self
            .api::<K>(&namespace)
            .replace(&name, &PostParams::default(), object)
            .await?)
    }
}

#[async_trait]
impl<K> StatusStore<K> for KubeStore
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    async fn update_status(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        let body = serde_json::to_value(object)?;
        let status_patch = serde_json::json!({
            "status": body.get("status").cloned().unwrap_or_default()
        });
        Ok(self
            .api::<K>(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&status_patch))
            .await?)
    }
}
