//! `watchdesk-core`: shared building blocks for the dashboard.
//!
//! This crate holds identifiers, the common error model and environment-backed
//! configuration. It has no async or IO concerns beyond reading variables.

pub mod config;
pub mod error;
pub mod id;

pub use config::{ConfigError, EnvLookup, ProviderConfig};
pub use error::CoreError;
pub use id::{ElementId, Email, PrincipalUid, SubscriptionId};
