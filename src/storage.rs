//! Local Storage Module
//!
//! A small string key/value store persisted as a JSON file. It plays the role
//! of the browser's local storage: pages record the last transaction hash here
//! for reference, and nothing in the resolution flow reads it back.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// Key under which the most recently handled transaction hash is kept
pub const LAST_TRANSACTION_HASH_KEY: &str = "lastTransactionHash";

// ============================================================================
// STORAGE IMPLEMENTATION
// ============================================================================

/// String key/value store, optionally backed by a JSON file.
///
/// Thread-safe via RwLock. Every write is flushed to the file when one is set.
pub struct LocalStore {
    /// Backing file (None keeps everything in memory)
    path: Option<PathBuf>,
    /// Map of key -> value
    entries: RwLock<HashMap<String, String>>,
}

impl LocalStore {
    /// Create an in-memory store.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Open a file-backed store, loading existing entries if the file exists.
    ///
    /// # Returns
    ///
    /// * `Ok(LocalStore)` - Store ready for use
    /// * `Err(anyhow::Error)` - The file exists but could not be read or parsed
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read local storage {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse local storage {}", path.display()))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    /// Get a value by key.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    /// Set a value and flush it.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    /// Remove a value and flush. Returns the removed value, if any.
    pub async fn remove(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(key);
        self.flush(&entries).await?;
        Ok(removed)
    }

    /// Record the hash of the most recently handled transaction.
    pub async fn record_last_transaction(&self, hash: &str) -> Result<()> {
        debug!("Recording last transaction hash {}", hash);
        self.set(LAST_TRANSACTION_HASH_KEY, hash).await
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write local storage {}", path.display()))
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
