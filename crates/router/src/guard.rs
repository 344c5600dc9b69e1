//! Navigation guard.
//!
//! Runs once per navigation attempt and keeps nothing between attempts:
//! 1. resolve the destination and union its requirement flags,
//! 2. resolve the current principal,
//! 3. look up admin membership, then inspector membership only if not admin,
//! 4. apply the decision table in [`decide`].
//!
//! Role lookup failures are logged and count as "role not granted" for that
//! lookup only. Identity failures propagate.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use watchdesk_auth::{
    AuthResolver, IdentityError, IdentityProvider, Principal, Role, RoleFlags, RoleStore,
};

use crate::config::GuardConfig;
use crate::route::{Requirements, RouteError, RouteTable};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("could not resolve the current principal: {0}")]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Route(#[from] RouteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// Destination needs a principal and there is none.
    LoginRequired,
    /// Guest-only destination (login) while signed in.
    AlreadyAuthenticated,
    AdminRequired,
    InspectorRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    Allow,
    Redirect { to: String, reason: RedirectReason },
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationDecision::Allow)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            NavigationDecision::Redirect { to, .. } => Some(to),
            NavigationDecision::Allow => None,
        }
    }
}

/// Everything the guard established for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardOutcome {
    /// Destination after route-level redirects.
    pub destination: String,
    pub requirements: Requirements,
    pub signed_in: bool,
    pub roles: RoleFlags,
    pub decision: NavigationDecision,
}

/// Pure decision table, evaluated in priority order.
pub fn decide(
    requirements: &Requirements,
    signed_in: bool,
    roles: RoleFlags,
    config: &GuardConfig,
) -> NavigationDecision {
    let redirect = |to: &str, reason| NavigationDecision::Redirect {
        to: to.to_string(),
        reason,
    };

    if requirements.requires_auth && !signed_in {
        redirect(&config.login_route, RedirectReason::LoginRequired)
    } else if requirements.guest_only && signed_in {
        redirect(&config.root_route, RedirectReason::AlreadyAuthenticated)
    } else if requirements.requires_admin && !roles.has(Role::Admin) {
        redirect(&config.root_route, RedirectReason::AdminRequired)
    } else if requirements.requires_inspector && !roles.has(Role::Inspector) {
        redirect(&config.root_route, RedirectReason::InspectorRequired)
    } else {
        NavigationDecision::Allow
    }
}

pub struct RouteGuard<P, S> {
    resolver: AuthResolver<P>,
    store: S,
    routes: Arc<RouteTable>,
    config: GuardConfig,
}

impl<P, S> core::fmt::Debug for RouteGuard<P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P, S> RouteGuard<P, S>
where
    P: IdentityProvider,
    S: RoleStore,
{
    pub fn new(provider: P, store: S, routes: Arc<RouteTable>, config: GuardConfig) -> Self {
        let resolver = AuthResolver::new(provider).with_timeout(config.resolve_timeout());
        Self {
            resolver,
            store,
            routes,
            config,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Evaluate a navigation to `destination`.
    pub async fn check(&self, destination: &str) -> Result<GuardOutcome, GuardError> {
        let resolution = self.routes.resolve(destination)?;
        let requirements = resolution.requirements;

        let principal = self.resolver.resolve_current_principal().await?;
        let roles = match &principal {
            Some(p) => self.resolve_roles(p).await,
            None => RoleFlags::NONE,
        };

        let decision = decide(&requirements, principal.is_some(), roles, &self.config);

        match &decision {
            NavigationDecision::Redirect {
                reason: reason @ (RedirectReason::AdminRequired | RedirectReason::InspectorRequired),
                to,
            } => {
                tracing::warn!(
                    destination = %resolution.path,
                    redirect = %to,
                    ?reason,
                    uid = principal.as_ref().map(|p| p.uid.as_str()),
                    "access denied: principal lacks the required role"
                );
            }
            _ => {
                tracing::debug!(
                    destination = %resolution.path,
                    signed_in = principal.is_some(),
                    ?roles,
                    ?decision,
                    "navigation evaluated"
                );
            }
        }

        Ok(GuardOutcome {
            destination: resolution.path,
            requirements,
            signed_in: principal.is_some(),
            roles,
            decision,
        })
    }

    /// Admin first; the inspector collection is consulted only for non-admins.
    async fn resolve_roles(&self, principal: &Principal) -> RoleFlags {
        let Some(key) = self.config.role_key.key_for(principal) else {
            tracing::debug!(
                uid = %principal.uid,
                strategy = ?self.config.role_key,
                "principal has no role lookup key; no roles granted"
            );
            return RoleFlags::NONE;
        };

        if self.has_role(Role::Admin, key).await {
            return RoleFlags::admin();
        }

        RoleFlags {
            admin: false,
            inspector: self.has_role(Role::Inspector, key).await,
        }
    }

    async fn has_role(&self, role: Role, key: &str) -> bool {
        let collection = self.config.collection(role);
        match self.store.get(collection, key).await {
            Ok(Some(record)) => match self.config.flag_field(role) {
                Some(field) => record.flag(field),
                None => true,
            },
            Ok(None) => false,
            Err(error) => {
                tracing::error!(%error, %role, collection, "error checking role membership");
                false
            }
        }
    }
}
