//! Strongly-typed identifiers used across the dashboard.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Opaque identifier assigned to a principal by the identity provider.
///
/// Provider uids are not UUIDs, so this wraps the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalUid(String);

impl PrincipalUid {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::invalid_id("PrincipalUid: empty"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PrincipalUid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PrincipalUid {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrincipalUid> for String {
    fn from(value: PrincipalUid) -> Self {
        value.0
    }
}

/// Email address of a principal, normalised to lowercase.
///
/// Role records are keyed by this value, so normalisation must be stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = raw.as_ref().trim();
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(CoreError::validation("invalid email format"));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(CoreError::validation("invalid email format"));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Identifier of an element attached to a presentation surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

/// Identifier of an identity-provider subscription.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty) => {
        impl $t {
            /// Create a new identifier (UUIDv7, time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_uuid_newtype!(ElementId);
impl_uuid_newtype!(SubscriptionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = Email::parse("  Inspector.One@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "inspector.one@example.com");
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(Email::parse("not-an-email").is_err());
        assert!(Email::parse("@example.com").is_err());
        assert!(Email::parse("a@b@c").is_err());
    }

    #[test]
    fn principal_uid_rejects_blank() {
        assert!(PrincipalUid::new("   ").is_err());
        assert_eq!(PrincipalUid::new("u-1").unwrap().as_str(), "u-1");
    }

    #[test]
    fn email_deserialization_validates() {
        let ok: Email = serde_json::from_str("\"Ops@Example.com\"").unwrap();
        assert_eq!(ok.as_str(), "ops@example.com");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(ElementId::new(), ElementId::new());
        assert_ne!(SubscriptionId::default(), SubscriptionId::default());
    }
}
