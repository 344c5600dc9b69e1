//! `watchdesk-app`: the surveillance dashboard shell.
//!
//! Route table, fixture seeding and the wiring used by the `watchdesk` binary
//! and the scenario tests.

pub mod dashboard;
pub mod fixture;
pub mod routes;

pub use dashboard::{Dashboard, DemoDashboard};
pub use fixture::{Fixture, FixtureError};
pub use routes::{dashboard_routes, dashboard_table};
