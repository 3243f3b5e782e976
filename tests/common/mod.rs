#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from routeslips for tests
pub use routeslips::{
    Circuit, CircuitCatalog, CircuitStatus, KeyValueStore, MemoryStore, RouteError,
    RouteSession, RouteStatus, SqliteStore, StatusStore, Subscriber,
};
