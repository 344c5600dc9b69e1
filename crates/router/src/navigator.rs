//! Drives navigations through the guard until a destination is allowed.
//!
//! Concurrent pushes are not serialised: each runs its own guard evaluation
//! and the current location is whichever finished last.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use watchdesk_auth::{IdentityProvider, RoleStore};

use crate::guard::{GuardError, GuardOutcome, NavigationDecision, RouteGuard};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("navigation to '{requested}' exceeded {hops} guard redirects")]
    TooManyRedirects { requested: String, hops: usize },
}

/// Result of a completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    /// Where the navigation ended up after all redirects.
    pub landed: String,
    /// One guard outcome per evaluated destination, in order.
    pub hops: Vec<GuardOutcome>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        self.hops.len() > 1
    }
}

#[derive(Debug)]
pub struct Navigator<P, S> {
    guard: RouteGuard<P, S>,
    current: Mutex<Option<String>>,
}

impl<P, S> Navigator<P, S>
where
    P: IdentityProvider,
    S: RoleStore,
{
    pub fn new(guard: RouteGuard<P, S>) -> Self {
        Self {
            guard,
            current: Mutex::new(None),
        }
    }

    pub fn guard(&self) -> &RouteGuard<P, S> {
        &self.guard
    }

    /// Location of the last completed navigation.
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `destination`, re-running the guard for every redirect.
    ///
    /// On error the current location is left unchanged.
    pub async fn push(&self, destination: &str) -> Result<Navigation, NavigationError> {
        let max_hops = self.guard.config().max_redirects;
        let mut target = destination.to_string();
        let mut hops = Vec::new();

        loop {
            let outcome = self.guard.check(&target).await?;
            let decision = outcome.decision.clone();
            let landed = outcome.destination.clone();
            hops.push(outcome);

            match decision {
                NavigationDecision::Allow => {
                    *self.current.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(landed.clone());
                    tracing::info!(requested = destination, landed = %landed, hops = hops.len(), "navigation completed");
                    return Ok(Navigation {
                        requested: destination.to_string(),
                        landed,
                        hops,
                    });
                }
                NavigationDecision::Redirect { to, .. } => {
                    if hops.len() > max_hops {
                        return Err(NavigationError::TooManyRedirects {
                            requested: destination.to_string(),
                            hops: hops.len(),
                        });
                    }
                    target = to;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use watchdesk_auth::{IdentityError, InMemoryIdentityProvider, InMemoryRoleStore, Principal};
    use watchdesk_core::{Email, PrincipalUid};

    use crate::config::GuardConfig;
    use crate::guard::RedirectReason;
    use crate::route::{RouteDescriptor, RouteMeta, RouteTable};

    fn routes() -> Arc<RouteTable> {
        Arc::new(
            RouteTable::new(vec![
                RouteDescriptor::new("/").meta(RouteMeta::authenticated()),
                RouteDescriptor::new("/login").meta(RouteMeta::guest_only()),
                RouteDescriptor::new("/admin")
                    .meta(RouteMeta::admin())
                    .children(vec![RouteDescriptor::new("reports")]),
            ])
            .unwrap(),
        )
    }

    fn inspector() -> Principal {
        Principal::new(
            PrincipalUid::new("uid-insp").unwrap(),
            Some(Email::parse("insp@example.com").unwrap()),
        )
    }

    #[tokio::test]
    async fn anonymous_user_lands_on_login() {
        let nav = Navigator::new(RouteGuard::new(
            InMemoryIdentityProvider::signed_out(),
            InMemoryRoleStore::new(),
            routes(),
            GuardConfig::default(),
        ));

        let done = nav.push("/admin/reports").await.unwrap();
        assert_eq!(done.landed, "/login");
        assert_eq!(done.hops.len(), 2);
        assert_eq!(nav.current().as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn denied_inspector_is_redirected_once_then_allowed() {
        let store = InMemoryRoleStore::new().with_member("inspectors", "insp@example.com");
        let nav = Navigator::new(RouteGuard::new(
            InMemoryIdentityProvider::signed_in(inspector()),
            store,
            routes(),
            GuardConfig::default(),
        ));

        let done = nav.push("/admin/reports").await.unwrap();
        assert_eq!(done.landed, "/");
        let denials = done
            .hops
            .iter()
            .filter(|h| {
                matches!(
                    h.decision,
                    NavigationDecision::Redirect {
                        reason: RedirectReason::AdminRequired,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(denials, 1);
        assert!(done.was_redirected());
    }

    #[tokio::test]
    async fn redirect_cycle_is_cut_off() {
        // Root demands a role the principal lacks, so it redirects to itself.
        let table = Arc::new(
            RouteTable::new(vec![
                RouteDescriptor::new("/").meta(RouteMeta::admin()),
                RouteDescriptor::new("/login").meta(RouteMeta::guest_only()),
            ])
            .unwrap(),
        );
        let config = GuardConfig {
            max_redirects: 3,
            ..GuardConfig::default()
        };
        let nav = Navigator::new(RouteGuard::new(
            InMemoryIdentityProvider::signed_in(inspector()),
            InMemoryRoleStore::new(),
            table,
            config,
        ));

        let err = nav.push("/").await.unwrap_err();
        assert_eq!(
            err,
            NavigationError::TooManyRedirects {
                requested: "/".into(),
                hops: 4
            }
        );
        assert_eq!(nav.current(), None);
    }

    #[tokio::test]
    async fn identity_failure_leaves_location_unchanged() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let nav = Arc::new(Navigator::new(RouteGuard::new(
            provider.clone(),
            InMemoryRoleStore::new(),
            routes(),
            GuardConfig::default(),
        )));

        let pending = {
            let nav = nav.clone();
            tokio::spawn(async move { nav.push("/").await })
        };
        tokio::task::yield_now().await;
        provider.fail(IdentityError::Unavailable("offline".into()));

        assert!(matches!(
            pending.await.unwrap(),
            Err(NavigationError::Guard(GuardError::Identity(_)))
        ));
        assert_eq!(nav.current(), None);
    }
}
