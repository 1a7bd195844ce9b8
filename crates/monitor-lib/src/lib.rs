//! Monitoring provisioning library for Google Cloud projects
//!
//! This crate provides the core functionality for:
//! - Budget provisioning with a fixed threshold schedule
//! - Dashboard provisioning with metric reference checks
//! - Log-based metric provisioning with create-or-update
//! - Read-only validation of the whole monitoring pipeline
//! - REST clients for the Google Cloud management APIs

pub mod catalog;
pub mod error;
pub mod gcp;
pub mod models;
pub mod observability;
pub mod provision;
pub mod settings;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CloudError, ErrorKind, MonitorError};
pub use gcp::GcpClients;
pub use observability::{init_tracing, LogFormat, ProvisionLogger};
pub use settings::Settings;
