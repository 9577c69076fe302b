//! The conversation memory store.
//!
//! Holds what the bot learned through conversation (its nickname, words the
//! user likes, ...) keyed per bot identity. Encoders and decoders read it
//! synchronously in the middle of a turn, including recursively during tag
//! expansion, so every write lands in the in-process cache first; the
//! backend write is fired off in the background and must never block or
//! fail the turn.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};

use crate::backend::MemoryBackend;

pub struct MemoryStore {
    bot_id: String,
    backend: Arc<dyn MemoryBackend>,
    cache: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    /// Open the store for one bot identity, loading every persisted row into
    /// the cache. If the store is empty, `seed` is persisted first; an
    /// existing store wins over the seed.
    pub async fn open(
        backend: Arc<dyn MemoryBackend>,
        bot_id: impl Into<String>,
        seed: HashMap<String, Vec<String>>,
    ) -> Result<Self> {
        let bot_id = bot_id.into();
        let mut rows = backend
            .load_all(&bot_id)
            .await
            .with_context(|| format!("loading memory for bot \"{bot_id}\""))?;

        if rows.is_empty() && !seed.is_empty() {
            for (key, values) in &seed {
                backend
                    .store(&bot_id, key, values.clone())
                    .await
                    .with_context(|| format!("seeding memory key \"{key}\""))?;
            }
            tracing::info!(bot = %bot_id, keys = seed.len(), "seeded empty memory");
            rows = seed;
        }

        Ok(Self {
            bot_id,
            backend,
            cache: RwLock::new(rows),
        })
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    /// Value list for a key; empty when absent. Served from the cache only.
    pub fn values(&self, key: &str) -> Vec<String> {
        self.cache
            .read()
            .expect("memory cache lock poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.cache
            .read()
            .expect("memory cache lock poisoned")
            .contains_key(key)
    }

    /// Replace the value list for a key.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        let values = vec![value.into()];
        self.cache
            .write()
            .expect("memory cache lock poisoned")
            .insert(key.to_string(), values.clone());
        self.persist(key, values);
    }

    /// Append a value to a key, deduplicating against the cached list.
    pub fn add(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let values = {
            let mut cache = self.cache.write().expect("memory cache lock poisoned");
            let list = cache.entry(key.to_string()).or_default();
            if !list.contains(&value) {
                list.push(value);
            }
            list.clone()
        };
        self.persist(key, values);
    }

    /// Fire-and-forget backend write. The cache is already current; a
    /// backend failure costs durability, not correctness of this turn.
    fn persist(&self, key: &str, values: Vec<String>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(key, "no runtime; memory write stays cache-only");
            return;
        };
        let backend = self.backend.clone();
        let bot_id = self.bot_id.clone();
        let key = key.to_string();
        handle.spawn(async move {
            if let Err(e) = backend.store(&bot_id, &key, values).await {
                tracing::warn!(bot = %bot_id, key, error = %e, "memory write failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    async fn open_empty() -> MemoryStore {
        MemoryStore::open(Arc::new(InMemoryBackend::new()), "bot", HashMap::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn absent_key_reads_empty() {
        let store = open_empty().await;
        assert!(store.values("{BOT_NAME}").is_empty());
        assert!(!store.exists("{BOT_NAME}"));
    }

    #[tokio::test]
    async fn writes_are_visible_immediately() {
        let store = open_empty().await;
        store.set("{LAST}", "しまりす");
        // no await between write and read: the cache must already serve it
        assert_eq!(store.values("{LAST}"), vec!["しまりす"]);
    }

    #[tokio::test]
    async fn add_appends_and_dedups() {
        let store = open_empty().await;
        store.add("{BOT_NAME}", "しずく");
        store.add("{BOT_NAME}", "雫");
        store.add("{BOT_NAME}", "しずく");
        assert_eq!(store.values("{BOT_NAME}"), vec!["しずく", "雫"]);
    }

    #[tokio::test]
    async fn set_replaces_previous_values() {
        let store = open_empty().await;
        store.add("{LAST}", "a");
        store.add("{LAST}", "b");
        store.set("{LAST}", "c");
        assert_eq!(store.values("{LAST}"), vec!["c"]);
    }

    #[tokio::test]
    async fn seed_applies_only_to_empty_store() {
        let backend = Arc::new(InMemoryBackend::new());
        let seed = HashMap::from([("{ENTER}".to_string(), vec!["absent".to_string()])]);
        let store = MemoryStore::open(backend.clone(), "bot", seed.clone())
            .await
            .unwrap();
        assert_eq!(store.values("{ENTER}"), vec!["absent"]);
        store.set("{ENTER}", "appear");
        // allow the background write to land
        tokio::task::yield_now().await;

        let reopened = MemoryStore::open(backend, "bot", seed).await.unwrap();
        assert_eq!(reopened.values("{ENTER}"), vec!["appear"]);
    }

    #[tokio::test]
    async fn bots_are_isolated() {
        let backend = Arc::new(InMemoryBackend::new());
        let a = MemoryStore::open(backend.clone(), "a", HashMap::new())
            .await
            .unwrap();
        a.set("{BOT_NAME}", "しずく");
        let b = MemoryStore::open(backend, "b", HashMap::new()).await.unwrap();
        assert!(b.values("{BOT_NAME}").is_empty());
    }
}
