//! `watchdesk-router`: route table, navigation guard and navigator.
//!
//! Nothing here is global: a [`RouteGuard`] is built from an identity
//! provider, a role store, a [`RouteTable`] and a [`GuardConfig`], so tests can
//! substitute every collaborator.

pub mod config;
pub mod guard;
pub mod navigator;
pub mod route;

pub use config::GuardConfig;
pub use guard::{GuardError, GuardOutcome, NavigationDecision, RedirectReason, RouteGuard, decide};
pub use navigator::{Navigation, NavigationError, Navigator};
pub use route::{ComponentRef, Requirements, Resolution, RouteDescriptor, RouteError, RouteMatch, RouteMeta, RouteTable};
