//! Main controller implementation.
//!
//! Builds the Kubernetes-backed store, event recorder and reconciler from the
//! operator configuration, then hands them to the watcher.

use crate::backoff::BackoffRegistry;
use crate::config::OperatorConfig;
use crate::error::ControllerError;
use crate::events::KubeEventPublisher;
use crate::reconciler::Reconciler;
use crate::store::KubeStore;
use crate::watcher::{Context, watch_statics};
use kube::Client;
use std::sync::Arc;
use tracing::info;

/// Name the controller reports Events under.
pub const CONTROLLER_NAME: &str = "static-controller";

/// Main controller for Static website resources.
pub struct Controller {
    client: Client,
    config: OperatorConfig,
    context: Arc<Context>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: OperatorConfig) -> Result<Self, ControllerError> {
        info!("Initializing Static Website Controller");

        let client = Client::try_default().await?;

        let events = Arc::new(KubeEventPublisher::new(
            client.clone(),
            CONTROLLER_NAME,
            config.instance.clone(),
        ));
        let reconciler = Reconciler::new(KubeStore::new(client.clone()), events, config.sizing.clone());
        let context = Arc::new(Context {
            reconciler,
            backoff: BackoffRegistry::default(),
            resync_interval: config.resync_interval,
        });

        Ok(Self {
            client,
            config,
            context,
        })
    }

    /// Runs the controller until a shutdown signal is received.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Starting Static Website Controller");
        watch_statics(
            self.client,
            self.config.namespace.as_deref(),
            self.config.concurrency,
            self.context,
        )
        .await;
        info!("Static Website Controller shut down");
        Ok(())
    }
}
