//! Website CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the static website operator.

pub mod quantity;
pub mod static_site;

pub use static_site::*;
