pub mod circuit;
pub mod csv;
pub mod loader;
pub mod product;
pub mod session;
pub mod stairway;
pub mod status;
pub mod store;

pub use circuit::{Circuit, Subscriber, parse_circuit_data};
pub use csv::parse_line;
pub use loader::{CircuitCatalog, load_circuit, load_circuits};
pub use product::{ProductBadge, normalize_tag, product_badges, product_counts, product_tags};
pub use session::RouteSession;
pub use status::{CircuitStatus, RouteStatus, StatusStore};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
