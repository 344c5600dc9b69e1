//! Role store contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleStoreError {
    #[error("role store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied reading {collection}/{key}")]
    PermissionDenied { collection: String, key: String },
}

/// A document in a role collection. Its existence signals membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub collection: String,
    pub key: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RoleRecord {
    /// True only when `field` is present and exactly boolean `true`.
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Bool(true)))
    }
}

/// Point lookups against the remote document store.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<RoleRecord>, RoleStoreError>;
}

#[async_trait]
impl<S> RoleStore for Arc<S>
where
    S: RoleStore + ?Sized,
{
    async fn get(&self, collection: &str, key: &str) -> Result<Option<RoleRecord>, RoleStoreError> {
        (**self).get(collection, key).await
    }
}

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<(String, String), Map<String, Value>>,
    failing: HashMap<String, RoleStoreError>,
    queries: Vec<(String, String)>,
}

/// In-memory role store with failure injection and a query log.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: Mutex<Inner>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, collection: impl Into<String>, key: impl Into<String>, fields: Map<String, Value>) {
        self.lock()
            .documents
            .insert((collection.into(), key.into()), fields);
    }

    /// Builder form of [`InMemoryRoleStore::insert`] with no fields.
    pub fn with_member(self, collection: impl Into<String>, key: impl Into<String>) -> Self {
        self.insert(collection, key, Map::new());
        self
    }

    /// Make every lookup in `collection` fail with `error`.
    pub fn fail_collection(&self, collection: impl Into<String>, error: RoleStoreError) {
        self.lock().failing.insert(collection.into(), error);
    }

    pub fn heal_collection(&self, collection: &str) {
        self.lock().failing.remove(collection);
    }

    /// Every `(collection, key)` looked up so far, in order.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.lock().queries.clone()
    }

    pub fn query_count(&self, collection: &str) -> usize {
        self.lock()
            .queries
            .iter()
            .filter(|(c, _)| c == collection)
            .count()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<RoleRecord>, RoleStoreError> {
        let mut inner = self.lock();
        inner.queries.push((collection.to_string(), key.to_string()));

        if let Some(error) = inner.failing.get(collection) {
            return Err(error.clone());
        }

        Ok(inner
            .documents
            .get(&(collection.to_string(), key.to_string()))
            .map(|fields| RoleRecord {
                collection: collection.to_string(),
                key: key.to_string(),
                fields: fields.clone(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lookup_returns_record_and_logs_query() {
        let store = InMemoryRoleStore::new().with_member("admins", "boss@example.com");

        let hit = store.get("admins", "boss@example.com").await.unwrap();
        let miss = store.get("inspectors", "boss@example.com").await.unwrap();

        assert_eq!(hit.map(|r| r.key), Some("boss@example.com".to_string()));
        assert!(miss.is_none());
        assert_eq!(store.query_count("admins"), 1);
        assert_eq!(store.query_count("inspectors"), 1);
    }

    #[tokio::test]
    async fn failing_collection_errors_until_healed() {
        let store = InMemoryRoleStore::new().with_member("admins", "k");
        store.fail_collection("admins", RoleStoreError::Unavailable("timeout".into()));

        assert!(store.get("admins", "k").await.is_err());
        store.heal_collection("admins");
        assert!(store.get("admins", "k").await.unwrap().is_some());
    }

    #[test]
    fn flag_requires_literal_true() {
        let fields = |v: Value| match v {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let record = |v| RoleRecord {
            collection: "admins".into(),
            key: "k".into(),
            fields: fields(v),
        };

        assert!(record(json!({ "isAdmin": true })).flag("isAdmin"));
        assert!(!record(json!({ "isAdmin": "true" })).flag("isAdmin"));
        assert!(!record(json!({})).flag("isAdmin"));
    }
}
