mod memory;
mod sqlite;

use std::future::Future;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// One entry of an atomic batch: `Some` writes the value, `None` removes the key.
pub type BatchEntry<'a> = (&'a str, Option<String>);

/// String key-value storage the status store persists into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = anyhow::Result<Option<String>>>;
    fn set(&self, key: &str, value: String) -> impl Future<Output = anyhow::Result<()>>;
    fn remove(&self, key: &str) -> impl Future<Output = anyhow::Result<()>>;
    /// Apply all entries or none of them.
    fn write_batch(&self, entries: Vec<BatchEntry<'_>>) -> impl Future<Output = anyhow::Result<()>>;
}
