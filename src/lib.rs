pub mod config;
pub mod core;
pub mod error;

pub use config::Config;
pub use crate::core::{
    Circuit, CircuitCatalog, CircuitStatus, KeyValueStore, MemoryStore, RouteSession,
    RouteStatus, SqliteStore, StatusStore, Subscriber,
};
pub use error::RouteError;
