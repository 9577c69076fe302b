//! The persistence contract.
//!
//! Durability and transaction semantics belong to the backend, not the
//! engine; the engine only needs multi-valued get/put keyed by bot identity.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// All `(key, values)` rows stored for this bot.
    async fn load_all(&self, bot_id: &str) -> Result<HashMap<String, Vec<String>>>;

    /// Replace the stored value list for one key.
    async fn store(&self, bot_id: &str, key: &str, values: Vec<String>) -> Result<()>;
}

/// A process-local backend: the default for tests and for running without a
/// durable store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    rows: Mutex<HashMap<String, HashMap<String, Vec<String>>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryBackend for InMemoryBackend {
    async fn load_all(&self, bot_id: &str) -> Result<HashMap<String, Vec<String>>> {
        let rows = self.rows.lock().expect("backend lock poisoned");
        Ok(rows.get(bot_id).cloned().unwrap_or_default())
    }

    async fn store(&self, bot_id: &str, key: &str, values: Vec<String>) -> Result<()> {
        let mut rows = self.rows.lock().expect("backend lock poisoned");
        rows.entry(bot_id.to_string())
            .or_default()
            .insert(key.to_string(), values);
        Ok(())
    }
}
