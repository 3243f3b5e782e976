use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::core::store::{BatchEntry, KeyValueStore};

/// In-process store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn write_batch(&self, entries: Vec<BatchEntry<'_>>) -> anyhow::Result<()> {
        // A single write guard covers the whole batch.
        let mut guard = self.entries.write().await;
        for (key, value) in entries {
            match value {
                Some(value) => {
                    guard.insert(key.to_string(), value);
                }
                None => {
                    guard.remove(key);
                }
            }
        }
        Ok(())
    }
}
