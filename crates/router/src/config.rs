use std::time::Duration;

use serde::{Deserialize, Serialize};

use watchdesk_auth::{Role, RoleKeyStrategy};
use watchdesk_core::config::{self, ConfigError, EnvLookup, ProcessEnv};

use crate::route::DEFAULT_MAX_REDIRECTS;

/// Navigation guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub login_route: String,
    pub root_route: String,
    pub admin_collection: String,
    pub inspector_collection: String,
    pub role_key: RoleKeyStrategy,
    /// When set, an admin record only counts if this field is `true`.
    pub admin_flag_field: Option<String>,
    /// When set, an inspector record only counts if this field is `true`.
    pub inspector_flag_field: Option<String>,
    /// Unset means wait for the identity provider indefinitely.
    pub resolve_timeout_ms: Option<u64>,
    /// Guard redirects followed by the navigator before giving up.
    pub max_redirects: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            root_route: "/".to_string(),
            admin_collection: "admins".to_string(),
            inspector_collection: "inspectors".to_string(),
            role_key: RoleKeyStrategy::Email,
            admin_flag_field: None,
            inspector_flag_field: None,
            resolve_timeout_ms: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl GuardConfig {
    pub const PREFIX: &'static str = "WATCHDESK_GUARD_";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv)
    }

    /// Defaults overridden by any `WATCHDESK_GUARD_*` variables present.
    pub fn from_lookup(env: &impl EnvLookup) -> Result<Self, ConfigError> {
        let key = |name: &str| format!("{}{}", Self::PREFIX, name);
        let defaults = Self::default();

        Ok(Self {
            login_route: config::optional(env, &key("LOGIN_ROUTE")).unwrap_or(defaults.login_route),
            root_route: config::optional(env, &key("ROOT_ROUTE")).unwrap_or(defaults.root_route),
            admin_collection: config::optional(env, &key("ADMIN_COLLECTION"))
                .unwrap_or(defaults.admin_collection),
            inspector_collection: config::optional(env, &key("INSPECTOR_COLLECTION"))
                .unwrap_or(defaults.inspector_collection),
            role_key: config::parse_optional(env, &key("ROLE_KEY"))?.unwrap_or(defaults.role_key),
            admin_flag_field: config::optional(env, &key("ADMIN_FLAG_FIELD")),
            inspector_flag_field: config::optional(env, &key("INSPECTOR_FLAG_FIELD")),
            resolve_timeout_ms: config::parse_optional(env, &key("RESOLVE_TIMEOUT_MS"))?,
            max_redirects: config::parse_optional(env, &key("MAX_REDIRECTS"))?
                .unwrap_or(defaults.max_redirects),
        })
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout_ms.map(Duration::from_millis)
    }

    pub fn collection(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_collection,
            Role::Inspector => &self.inspector_collection,
        }
    }

    pub fn flag_field(&self, role: Role) -> Option<&str> {
        match role {
            Role::Admin => self.admin_flag_field.as_deref(),
            Role::Inspector => self.inspector_flag_field.as_deref(),
        }
    }
}
