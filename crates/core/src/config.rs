//! Environment-backed configuration.
//!
//! Loaders take an [`EnvLookup`] so tests can supply variables without touching
//! the process environment.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Source of configuration variables.
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| v.to_string())
    }
}

/// Read an optional variable; blank values count as unset.
pub fn optional(env: &impl EnvLookup, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(env: &impl EnvLookup, key: &str) -> Result<String, ConfigError> {
    optional(env, key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Read and parse an optional variable.
pub fn parse_optional<T>(env: &impl EnvLookup, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match optional(env, key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Connection settings for the hosted identity provider and document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub auth_domain: Option<String>,
    pub project_id: String,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

impl ProviderConfig {
    pub const PREFIX: &'static str = "WATCHDESK_PROVIDER_";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv)
    }

    pub fn from_lookup(env: &impl EnvLookup) -> Result<Self, ConfigError> {
        let key = |name: &str| format!("{}{}", Self::PREFIX, name);
        Ok(Self {
            api_key: required(env, &key("API_KEY"))?,
            auth_domain: optional(env, &key("AUTH_DOMAIN")),
            project_id: required(env, &key("PROJECT_ID"))?,
            storage_bucket: optional(env, &key("STORAGE_BUCKET")),
            messaging_sender_id: optional(env, &key("MESSAGING_SENDER_ID")),
            app_id: optional(env, &key("APP_ID")),
        })
    }
}
