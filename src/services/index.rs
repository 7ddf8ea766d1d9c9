use crate::error::{ClgError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Namespaced key/value mappings, e.g. from a node id to an information id.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Looks up `key` under `namespaces`. A miss is [`ClgError::NotFound`].
    async fn search(&self, namespaces: &[&str], key: &str) -> Result<String>;

    /// Maps `key` to `value` under `namespaces` unless a mapping already
    /// exists. The first mapping wins and is never replaced.
    async fn create(&self, namespaces: &[&str], key: &str, value: &str) -> Result<()>;
}

/// An [`IndexService`] kept in process memory.
#[derive(Default)]
pub struct MemoryIndex {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn scoped_key(namespaces: &[&str], key: &str) -> String {
    let mut scoped = namespaces.join(":");
    scoped.push(':');
    scoped.push_str(key);
    scoped
}

#[async_trait]
impl IndexService for MemoryIndex {
    async fn search(&self, namespaces: &[&str], key: &str) -> Result<String> {
        let scoped = scoped_key(namespaces, key);
        let entries = self
            .entries
            .lock()
            .map_err(|_| ClgError::Storage("index lock poisoned".to_string()))?;
        entries
            .get(&scoped)
            .cloned()
            .ok_or_else(|| ClgError::NotFound(format!("index entry '{}'", scoped)))
    }

    async fn create(&self, namespaces: &[&str], key: &str, value: &str) -> Result<()> {
        let scoped = scoped_key(namespaces, key);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClgError::Storage("index lock poisoned".to_string()))?;
        entries.entry(scoped).or_insert_with(|| value.to_string());
        Ok(())
    }
}
