//! Server configuration
//!
//! Resolved from the deployment secret store, falling back to the process
//! environment (a local `.env` is loaded first).

use anyhow::{bail, Context, Result};
use shuttle_runtime::SecretStore;

use crate::application::DEFAULT_EVENT_CAPACITY;

const STORAGE_KEY: &str = "FITMEM_STORAGE";
const EVENT_CAPACITY_KEY: &str = "FITMEM_EVENT_CAPACITY";
const LOG_KEY: &str = "FITMEM_LOG";

const DEFAULT_LOG_FILTER: &str = "fitmem_server=info";

/// Where memory documents are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    InMemory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "in_memory" => Ok(StorageBackend::InMemory),
            other => bail!("Unknown storage backend: {}", other),
        }
    }
}

/// Runtime settings for the API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub storage: StorageBackend,
    /// Broadcast ring size for memory notifications
    pub event_capacity: usize,
    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Postgres,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from secrets with environment fallback
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()))
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(storage) = lookup(STORAGE_KEY) {
            config.storage = storage
                .parse()
                .with_context(|| format!("Invalid {}", STORAGE_KEY))?;
        }

        if let Some(capacity) = lookup(EVENT_CAPACITY_KEY) {
            let capacity: usize = capacity
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {:?}", EVENT_CAPACITY_KEY, capacity))?;
            if capacity == 0 {
                bail!("{} must be greater than zero", EVENT_CAPACITY_KEY);
            }
            config.event_capacity = capacity;
        }

        if let Some(filter) = lookup(LOG_KEY) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.log_filter, "fitmem_server=info");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("FITMEM_STORAGE", "memory"),
            ("FITMEM_EVENT_CAPACITY", "256"),
            ("FITMEM_LOG", "fitmem_server=debug"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageBackend::InMemory);
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.log_filter, "fitmem_server=debug");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("FITMEM_STORAGE", "mongo")])).is_err());
        assert!(
            ServerConfig::from_lookup(lookup_from(&[("FITMEM_EVENT_CAPACITY", "lots")])).is_err()
        );
        assert!(ServerConfig::from_lookup(lookup_from(&[("FITMEM_EVENT_CAPACITY", "0")])).is_err());
    }
}
