pub mod demo;
pub mod fallback;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use fallback::FallbackStore;
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{DataSource, Store, StoreError, StoreResult};
