//! Wires the guard, navigator and dialogs into one dashboard shell.

use std::sync::Arc;

use watchdesk_auth::{IdentityProvider, InMemoryIdentityProvider, InMemoryRoleStore, RoleStore};
use watchdesk_dialog::{DialogService, HeadlessSurface, Severity, Surface};
use watchdesk_router::{
    GuardConfig, GuardError, Navigation, NavigationDecision, NavigationError, Navigator,
    RedirectReason, RouteError, RouteGuard,
};

use crate::fixture::Fixture;
use crate::routes::dashboard_table;

/// Dashboard backed entirely by in-memory collaborators.
pub type DemoDashboard =
    Dashboard<Arc<InMemoryIdentityProvider>, Arc<InMemoryRoleStore>, HeadlessSurface>;

#[derive(Debug)]
pub struct Dashboard<P, S, U> {
    navigator: Navigator<P, S>,
    dialogs: DialogService<U>,
}

impl<P, S, U> Dashboard<P, S, U>
where
    P: IdentityProvider,
    S: RoleStore,
    U: Surface + 'static,
{
    pub fn new(provider: P, store: S, config: GuardConfig, surface: Arc<U>) -> Result<Self, RouteError> {
        let guard = RouteGuard::new(provider, store, Arc::new(dashboard_table()?), config);
        Ok(Self {
            navigator: Navigator::new(guard),
            dialogs: DialogService::new(surface),
        })
    }

    pub fn navigator(&self) -> &Navigator<P, S> {
        &self.navigator
    }

    pub fn dialogs(&self) -> &DialogService<U> {
        &self.dialogs
    }

    pub fn current(&self) -> Option<String> {
        self.navigator.current()
    }

    /// Navigate to `path`, telling the user with a toast when a role check
    /// turned them away or their session could not be verified.
    pub async fn visit(&self, path: &str) -> Result<Navigation, NavigationError> {
        match self.navigator.push(path).await {
            Ok(navigation) => {
                if navigation.hops.iter().any(|hop| denied_by_role(&hop.decision)) {
                    self.dialogs.show_toast(
                        "You do not have access to that page",
                        Some(Severity::Warning),
                        None,
                    );
                }
                Ok(navigation)
            }
            Err(err) => {
                let message = match &err {
                    NavigationError::Guard(GuardError::Identity(_)) => {
                        "Could not verify your session"
                    }
                    _ => "Navigation failed",
                };
                self.dialogs.show_toast(message, Some(Severity::Error), None);
                Err(err)
            }
        }
    }
}

impl DemoDashboard {
    /// Seed a dashboard from `fixture`. The provider and store handles are
    /// returned so callers can change the session or roles afterwards.
    pub fn from_fixture(
        fixture: &Fixture,
        config: GuardConfig,
        surface: Arc<HeadlessSurface>,
    ) -> Result<(Self, Arc<InMemoryIdentityProvider>, Arc<InMemoryRoleStore>), RouteError> {
        let provider = Arc::new(fixture.provider());
        let store = Arc::new(fixture.store());
        let dashboard = Self::new(provider.clone(), store.clone(), config, surface)?;
        Ok((dashboard, provider, store))
    }
}

fn denied_by_role(decision: &NavigationDecision) -> bool {
    matches!(
        decision,
        NavigationDecision::Redirect {
            reason: RedirectReason::AdminRequired | RedirectReason::InspectorRequired,
            ..
        }
    )
}
