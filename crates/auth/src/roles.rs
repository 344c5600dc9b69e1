use serde::{Deserialize, Serialize};

use crate::Principal;

/// Dashboard roles backed by role collections in the document store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Inspector,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Inspector => "inspector",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role membership resolved for one navigation.
///
/// Admin short-circuits the inspector lookup, so `admin && inspector` is never
/// produced by the guard even when both records exist.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags {
    pub admin: bool,
    pub inspector: bool,
}

impl RoleFlags {
    pub const NONE: RoleFlags = RoleFlags {
        admin: false,
        inspector: false,
    };

    pub fn admin() -> Self {
        Self {
            admin: true,
            inspector: false,
        }
    }

    pub fn inspector() -> Self {
        Self {
            admin: false,
            inspector: true,
        }
    }

    pub fn has(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.admin,
            Role::Inspector => self.inspector,
        }
    }
}

/// Which principal attribute keys role records.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKeyStrategy {
    /// Records keyed by email (current layout).
    #[default]
    Email,
    /// Records keyed by provider uid (older layout).
    Uid,
}

impl RoleKeyStrategy {
    /// Lookup key for `principal`, if it carries the required attribute.
    pub fn key_for<'a>(&self, principal: &'a Principal) -> Option<&'a str> {
        match self {
            RoleKeyStrategy::Email => principal.email.as_ref().map(|e| e.as_str()),
            RoleKeyStrategy::Uid => Some(principal.uid.as_str()),
        }
    }
}

impl core::str::FromStr for RoleKeyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(RoleKeyStrategy::Email),
            "uid" => Ok(RoleKeyStrategy::Uid),
            other => Err(format!("unknown role key strategy '{other}' (expected email|uid)")),
        }
    }
}
