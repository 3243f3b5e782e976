use std::path::Path;

use routeslips::{MemoryStore, SqliteStore, StatusStore, Subscriber};
use tempfile::TempDir;

pub const HEADER: &str = "Sivu,Katu,Osoite,Nimi,Merkinnät";

/// Creates a data directory with one file per `(file name, contents)` pair.
/// The directory is removed when the returned TempDir is dropped.
pub fn create_data_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp data directory");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("Failed to write circuit file");
    }
    dir
}

/// Circuit file text: header line followed by the given rows.
pub fn circuit_text(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

pub fn memory_status_store() -> StatusStore<MemoryStore> {
    StatusStore::new(MemoryStore::new())
}

/// Creates a SQLite-backed store in a temp directory.
/// Returns both the store and the directory (which must be kept alive).
pub async fn create_sqlite_store() -> (SqliteStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store = open_sqlite_store(dir.path()).await;
    (store, dir)
}

pub async fn open_sqlite_store(dir: &Path) -> SqliteStore {
    SqliteStore::open(dir.join("state.db"))
        .await
        .expect("Failed to open state database")
}

/// Creates a Subscriber whose address field is "<street> <number>".
pub fn make_subscriber(product: &str, street: &str, number: &str, name: &str) -> Subscriber {
    Subscriber {
        product: product.to_string(),
        street: street.to_string(),
        number: number.to_string(),
        full_address: format!("{street} {number}"),
        name: name.to_string(),
    }
}
