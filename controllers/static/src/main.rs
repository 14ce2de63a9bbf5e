//! Static Website Controller
//!
//! Keeps every `Static` resource backed by three dependents:
//! - Deployment: nginx serving content copied from object storage
//! - Service: LoadBalancer exposing the Deployment
//! - HorizontalPodAutoscaler: scales the Deployment between the declared bounds
//!
//! Replica count and external address are mirrored back onto the Static status.

mod backoff;
mod builders;
mod config;
mod controller;
mod diff;
mod error;
mod events;
mod reconciler;
mod store;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::OperatorConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube's rustls-tls needs a process-wide crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    info!("Starting Static Website Controller");

    let config = OperatorConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Resync interval: {:?}", config.resync_interval);
    info!("  Concurrency: {}", config.concurrency);
    info!(
        "  Sizing: memory {}Mi/{}Mi, cpu {}m/{}m, target utilization {}%",
        config.sizing.memory_request_mi,
        config.sizing.memory_limit_mi,
        config.sizing.cpu_request_milli,
        config.sizing.cpu_limit_milli,
        config.sizing.cpu_utilization
    );

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
