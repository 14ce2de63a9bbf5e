//! Operator configuration.
//!
//! Loaded once from environment variables at startup and shared read-only
//! afterwards. The sizing part is handed explicitly to every builder call.

use crate::error::ControllerError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Resource sizing applied to every website, independent of the Static spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingConfig {
    /// Memory request of the serving container, in MiB
    pub memory_request_mi: i64,
    /// Memory limit of the serving container, in MiB
    pub memory_limit_mi: i64,
    /// CPU request of the serving container, in millicores
    pub cpu_request_milli: i64,
    /// CPU limit of the serving container, in millicores
    pub cpu_limit_milli: i64,
    /// Target average CPU utilization for the autoscaler, in percent of the request
    pub cpu_utilization: i32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            memory_request_mi: 32,
            memory_limit_mi: 128,
            cpu_request_milli: 100,
            cpu_limit_milli: 500,
            cpu_utilization: 400,
        }
    }
}

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    pub sizing: SizingConfig,
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// Requeue delay after a successful pass (periodic safety-net sweep)
    pub resync_interval: Duration,
    /// Maximum number of Static resources reconciled concurrently
    pub concurrency: u16,
    /// Reporting instance attached to published Events (`POD_NAME`)
    pub instance: Option<String>,
}

impl OperatorConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SizingConfig::default();
        let sizing = SizingConfig {
            memory_request_mi: parse_or(&lookup, "MEMORY_REQUEST_MI", defaults.memory_request_mi)?,
            memory_limit_mi: parse_or(&lookup, "MEMORY_LIMIT_MI", defaults.memory_limit_mi)?,
            cpu_request_milli: parse_or(&lookup, "CPU_REQUEST_MILLI", defaults.cpu_request_milli)?,
            cpu_limit_milli: parse_or(&lookup, "CPU_LIMIT_MILLI", defaults.cpu_limit_milli)?,
            cpu_utilization: parse_or(&lookup, "CPU_UTILIZATION", defaults.cpu_utilization)?,
        };

        if sizing.memory_request_mi > sizing.memory_limit_mi {
            return Err(ControllerError::InvalidConfig(format!(
                "MEMORY_REQUEST_MI ({}) exceeds MEMORY_LIMIT_MI ({})",
                sizing.memory_request_mi, sizing.memory_limit_mi
            )));
        }
        if sizing.cpu_request_milli > sizing.cpu_limit_milli {
            return Err(ControllerError::InvalidConfig(format!(
                "CPU_REQUEST_MILLI ({}) exceeds CPU_LIMIT_MILLI ({})",
                sizing.cpu_request_milli, sizing.cpu_limit_milli
            )));
        }

        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        let resync_secs: u64 = parse_or(&lookup, "RESYNC_INTERVAL_SECS", 300)?;
        let concurrency = parse_or(&lookup, "RECONCILE_CONCURRENCY", 3)?;
        let instance = lookup("POD_NAME").filter(|name| !name.is_empty());

        Ok(Self {
            sizing,
            namespace,
            resync_interval: Duration::from_secs(resync_secs),
            concurrency,
            instance,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ControllerError::InvalidConfig(format!("{key} has invalid value {raw:?}"))
        }),
    }
}
