//! Reconciliation logic for Static resources.
//!
//! The owning [`Reconciler`] loads a Static by key and drives its three
//! dependents in a fixed order:
//! - `workload`: the Deployment serving the content
//! - `endpoint`: the LoadBalancer Service in front of it
//! - `autoscaler`: the HorizontalPodAutoscaler scaling the Deployment
//!
//! A pass stops at the first hard error. Every step recomputes the desired
//! state from scratch, so the next pass can safely redo the whole sequence.

pub mod autoscaler;
pub mod dependent;
pub mod endpoint;
pub mod workload;


use crate::config::SizingConfig;
use crate::error::ControllerError;
use crate::events::EventPublisher;
use crate::store::{ObjectStore, ResourceStore};
use autoscaler::Autoscaler;
use crds::Static;
use dependent::{Applied, DependentKind, reconcile_dependent};
use endpoint::Endpoint;
use std::sync::Arc;
use tracing::{debug, info};
use workload::Workload;

/// Result of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All dependents match the declared state
    Converged,
    /// The Static no longer exists; nothing to do
    Gone,
}

/// Reconciles Static resources against a resource store.
pub struct Reconciler<S> {
    store: S,
    events: Arc<dyn EventPublisher>,
    sizing: SizingConfig,
}

impl<S: ResourceStore> Reconciler<S> {
    /// Creates a new reconciler instance.
    pub fn new(store: S, events: Arc<dyn EventPublisher>, sizing: SizingConfig) -> Self {
        Self {
            store,
            events,
            sizing,
        }
    }

    /// Runs one pass for the Static `namespace/name`.
    pub async fn reconcile(&self, namespace: &str, name: &str) -> Result<Outcome, ControllerError> {
        let Some(mut site) = ObjectStore::<Static>::get(&self.store, namespace, name).await? else {
            debug!("Static {}/{} not found, nothing to reconcile", namespace, name);
            return Ok(Outcome::Gone);
        };

        info!("Reconciling Static {}/{}", namespace, name);

        site.spec
            .validate()
            .map_err(|e| ControllerError::InvalidSpec(format!("{namespace}/{name}: {e}")))?;

        for kind in DependentKind::ORDER {
            let applied = self.apply(kind, &mut site).await?;
            debug!("Static {}/{}: {} {:?}", namespace, name, kind, applied);
        }

        Ok(Outcome::Converged)
    }

    async fn apply(&self, kind: DependentKind, site: &mut Static) -> Result<Applied, ControllerError> {
        let events = self.events.as_ref();
        match kind {
            DependentKind::Workload => {
                reconcile_dependent::<Workload, S>(&self.store, events, site, &self.sizing).await
            }
            DependentKind::Endpoint => {
                reconcile_dependent::<Endpoint, S>(&self.store, events, site, &self.sizing).await
            }
            DependentKind::Autoscaler => {
                reconcile_dependent::<Autoscaler, S>(&self.store, events, site, &self.sizing).await
            }
        }
    }
}
