//! Shared get → diff → create-or-update driver for dependent objects.
//!
//! Each dependent kind plugs its builder, comparison surface, carry-forward
//! rules and status back-sync into [`Dependent`]; [`reconcile_dependent`]
//! runs the same single pass for all of them.

use crate::config::SizingConfig;
use crate::diff::needs_update;
use crate::error::ControllerError;
use crate::events::{EventPublisher, actions, reasons};
use crate::store::{ObjectStore, StatusStore};
use crds::{Static, StaticStatus};
use kube::{Resource, ResourceExt};
use kube_runtime::events::EventType;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// The dependent kinds owned by a Static, in reconciliation order.
///
/// The Deployment comes before the autoscaler that references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentKind {
    Workload,
    Endpoint,
    Autoscaler,
}

impl DependentKind {
    pub const ORDER: [DependentKind; 3] = [Self::Workload, Self::Endpoint, Self::Autoscaler];

    fn created_reason(self) -> &'static str {
        match self {
            Self::Workload => reasons::DEPLOYMENT_CREATED,
            Self::Endpoint => reasons::SERVICE_CREATED,
            Self::Autoscaler => reasons::AUTOSCALER_CREATED,
        }
    }

    fn updated_reason(self) -> &'static str {
        match self {
            Self::Workload => reasons::DEPLOYMENT_UPDATED,
            Self::Endpoint => reasons::SERVICE_UPDATED,
            Self::Autoscaler => reasons::AUTOSCALER_UPDATED,
        }
    }
}

impl fmt::Display for DependentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Workload => "Deployment",
            Self::Endpoint => "Service",
            Self::Autoscaler => "HorizontalPodAutoscaler",
        })
    }
}

/// What a single dependent pass did to the dependent object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
    Unchanged,
}

/// A change to write back onto the Static's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Replicas(i32),
    ExternalAddress(String),
}

impl StatusChange {
    fn apply(&self, status: &mut StaticStatus) {
        match self {
            Self::Replicas(replicas) => status.replicas = *replicas,
            Self::ExternalAddress(address) => status.external_ip.clone_from(address),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Replicas(_) => reasons::REPLICAS_UPDATED,
            Self::ExternalAddress(_) => reasons::EXTERNAL_ADDRESS_UPDATED,
        }
    }

    fn note(&self) -> String {
        match self {
            Self::Replicas(replicas) => format!("The replicas has been updated to {replicas}"),
            Self::ExternalAddress(address) => format!("The external IP has been updated to {address}"),
        }
    }
}

/// Kind-specific rules for one dependent object.
pub trait Dependent {
    type Object: Resource<DynamicType = ()> + Clone + Serialize + Send + Sync + 'static;

    const KIND: DependentKind;

    /// Expected shape of the object for `site`.
    fn build(site: &Static, sizing: &SizingConfig) -> Self::Object;

    /// The part of the object this controller owns and compares.
    fn owned_fields(object: &Self::Object) -> Result<Value, serde_json::Error>;

    /// Copies externally owned fields from `observed` into `expected`.
    ///
    /// The resource version always travels, so a concurrent write turns the
    /// update into a conflict instead of a lost update.
    fn carry_forward(expected: &mut Self::Object, observed: &Self::Object) {
        expected
            .meta_mut()
            .resource_version
            .clone_from(&observed.meta().resource_version);
    }

    /// The object actually sent on update.
    fn prepare_update(expected: Self::Object, _observed: &Self::Object) -> Self::Object {
        expected
    }

    /// Status field to mirror from the observed object, if it changed.
    fn back_sync(_observed: &Self::Object, _status: &StaticStatus) -> Option<StatusChange> {
        None
    }
}

/// Sets `site` as the controlling owner of `object`.
fn set_owner<K: Resource>(object: &mut K, site: &Static) -> Result<(), ControllerError> {
    let mut owner = site.controller_owner_ref(&()).ok_or_else(|| {
        ControllerError::OwnerReference(format!(
            "Static {} has no uid; cannot own {}",
            site.name_any(),
            object.name_any()
        ))
    })?;
    owner.block_owner_deletion = Some(true);
    object.meta_mut().owner_references = Some(vec![owner]);
    Ok(())
}

/// Writes a status change back onto the Static via a status-only update.
async fn sync_status<S>(
    store: &S,
    events: &dyn EventPublisher,
    site: &mut Static,
    change: StatusChange,
) -> Result<(), ControllerError>
where
    S: StatusStore<Static> + ?Sized,
{
    let mut status = site.status_or_default();
    change.apply(&mut status);

    let mut updated = site.clone();
    updated.status = Some(status);
    StatusStore::<Static>::update_status(store, &updated).await?;
    site.status = updated.status;

    info!("Static {}: {}", site.name_any(), change.note());
    events
        .publish(
            &site.object_ref(&()),
            EventType::Normal,
            change.reason(),
            actions::SYNC_STATUS,
            Some(change.note()),
        )
        .await;
    Ok(())
}

/// Runs one pass for dependent `D` of `site`.
pub async fn reconcile_dependent<D, S>(
    store: &S,
    events: &dyn EventPublisher,
    site: &mut Static,
    sizing: &SizingConfig,
) -> Result<Applied, ControllerError>
where
    D: Dependent,
    S: ObjectStore<D::Object> + StatusStore<Static> + ?Sized,
{
    let namespace = site
        .namespace()
        .ok_or(ControllerError::MissingObjectKey(".metadata.namespace"))?;
    let mut expected = D::build(site, sizing);
    let name = expected.name_any();

    let Some(observed) = ObjectStore::<D::Object>::get(store, &namespace, &name).await? else {
        info!("{} {}/{} not found, creating", D::KIND, namespace, name);
        set_owner(&mut expected, site)?;
        ObjectStore::<D::Object>::create(store, &expected).await?;
        events
            .publish(
                &site.object_ref(&()),
                EventType::Normal,
                D::KIND.created_reason(),
                actions::CREATE,
                Some(format!("The {} '{}.{}' has been created", D::KIND, namespace, name)),
            )
            .await;
        return Ok(Applied::Created);
    };

    if let Some(change) = D::back_sync(&observed, &site.status_or_default()) {
        sync_status(store, events, site, change).await?;
    }

    D::carry_forward(&mut expected, &observed);
    if !needs_update(&D::owned_fields(&expected)?, &D::owned_fields(&observed)?) {
        debug!("{} {}/{} is up-to-date", D::KIND, namespace, name);
        return Ok(Applied::Unchanged);
    }

    info!("{} {}/{} differs from expected, updating", D::KIND, namespace, name);
    set_owner(&mut expected, site)?;
    let merged = D::prepare_update(expected, &observed);
    ObjectStore::<D::Object>::update(store, &merged).await?;
    events
        .publish(
            &site.object_ref(&()),
            EventType::Normal,
            D::KIND.updated_reason(),
            actions::UPDATE,
            Some(format!(
                "The {} '{}.{}' has been updated due to unexpected change",
                D::KIND, namespace, name
            )),
        )
        .await;
    Ok(Applied::Updated)
}
