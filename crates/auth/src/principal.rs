use serde::{Deserialize, Serialize};

use watchdesk_core::{Email, PrincipalUid};

/// Identity of an authenticated user as reported by the identity provider.
///
/// The guard only ever reads a principal; the provider owns its lifecycle
/// (created on sign-in, gone on sign-out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: PrincipalUid,

    /// Secondary identifier; role records are keyed by it by default.
    pub email: Option<Email>,

    pub display_name: Option<String>,
}

impl Principal {
    pub fn new(uid: PrincipalUid, email: Option<Email>) -> Self {
        Self {
            uid,
            email,
            display_name: None,
        }
    }
}

/// Authentication state delivered to provider listeners.
///
/// Signed-out is an explicit value, distinct from "the provider has not
/// reported yet" (see [`crate::SessionState`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    SignedOut,
    SignedIn(Principal),
}

impl AuthState {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthState::SignedIn(p) => Some(p),
            AuthState::SignedOut => None,
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self {
            AuthState::SignedIn(p) => Some(p),
            AuthState::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

impl From<Option<Principal>> for AuthState {
    fn from(value: Option<Principal>) -> Self {
        match value {
            Some(p) => AuthState::SignedIn(p),
            None => AuthState::SignedOut,
        }
    }
}
