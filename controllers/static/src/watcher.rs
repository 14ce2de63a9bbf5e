//! Kubernetes resource watcher.
//!
//! Drives the reconciler with `kube_runtime::Controller`: Static changes and
//! changes to owned Deployments, Services and HorizontalPodAutoscalers all
//! map to the owning Static's key. Failed passes are retried with a per-key
//! Fibonacci backoff; converged passes requeue after the resync interval.

use crate::backoff::BackoffRegistry;
use crate::error::ControllerError;
use crate::reconciler::{Outcome, Reconciler};
use crate::store::KubeStore;
use crds::Static;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client, ResourceExt};
use kube_runtime::{Controller, controller::{Action, Config as ControllerConfig}, watcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile call.
pub struct Context {
    pub reconciler: Reconciler<KubeStore>,
    pub backoff: BackoffRegistry,
    pub resync_interval: Duration,
}

fn api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

async fn reconcile(site: Arc<Static>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let namespace = site
        .namespace()
        .ok_or(ControllerError::MissingObjectKey(".metadata.namespace"))?;
    let name = site.name_any();
    let key = format!("{namespace}/{name}");

    match ctx.reconciler.reconcile(&namespace, &name).await? {
        Outcome::Converged => {
            ctx.backoff.forget(&key);
            debug!("Static {} converged, next sweep in {:?}", key, ctx.resync_interval);
            Ok(Action::requeue(ctx.resync_interval))
        }
        Outcome::Gone => {
            ctx.backoff.forget(&key);
            Ok(Action::await_change())
        }
    }
}

fn error_policy(site: Arc<Static>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = format!("{}/{}", site.namespace().unwrap_or_default(), site.name_any());
    let delay = ctx.backoff.next(&key);
    warn!("Reconciliation of Static {} failed, retrying in {:?}: {}", key, delay, error);
    Action::requeue(delay)
}

/// Watches Static resources and their dependents until a shutdown signal arrives.
pub async fn watch_statics(
    client: Client,
    namespace: Option<&str>,
    concurrency: u16,
    ctx: Arc<Context>,
) {
    info!(
        "Starting Static watcher (namespace: {}, concurrency: {})",
        namespace.unwrap_or("all"),
        concurrency
    );

    let controller_config = ControllerConfig::default().concurrency(concurrency);

    Controller::new(api::<Static>(&client, namespace), watcher::Config::default())
        .owns(api::<Deployment>(&client, namespace), watcher::Config::default())
        .owns(api::<Service>(&client, namespace), watcher::Config::default())
        .owns(api::<HorizontalPodAutoscaler>(&client, namespace), watcher::Config::default())
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled Static {}", obj),
                Err(e) => error!("Controller error: {}", e),
            }
        })
        .await;

    info!("Static watcher stopped");
}
