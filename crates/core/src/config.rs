//! Host configuration lookup
//!
//! Configuration lives in the host's ini store; this layer reads and
//! writes flat string keys through a narrow trait and never parses
//! config files itself.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Host-provided key/value config access
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Returns false when the host rejected the write
    fn set(&self, key: &str, value: &str) -> bool;
}

/// In-memory store for tests and standalone runs
#[derive(Default)]
pub struct MemoryConfig {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        true
    }
}
