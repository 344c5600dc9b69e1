//! JSON fixtures that seed the in-memory identity provider and role store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use watchdesk_auth::{InMemoryIdentityProvider, InMemoryRoleStore, Principal, RoleRecord};

const DEMO: &str = include_str!("../fixtures/demo.json");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("could not read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Who is signed in, which role documents exist, and where to navigate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Absent means signed out.
    #[serde(default)]
    pub principal: Option<Principal>,
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    #[serde(default)]
    pub navigations: Vec<String>,
}

impl Fixture {
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Signed-in inspector with a mix of allowed and denied navigations.
    pub fn demo() -> Result<Self, FixtureError> {
        Self::from_json(DEMO)
    }

    pub fn provider(&self) -> InMemoryIdentityProvider {
        match &self.principal {
            Some(principal) => InMemoryIdentityProvider::signed_in(principal.clone()),
            None => InMemoryIdentityProvider::signed_out(),
        }
    }

    pub fn store(&self) -> InMemoryRoleStore {
        let store = InMemoryRoleStore::new();
        for record in &self.roles {
            store.insert(&record.collection, &record.key, record.fields.clone());
        }
        store
    }
}
