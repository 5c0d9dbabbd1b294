pub mod connection;
pub mod memory;
pub mod models;
pub mod pg_store;
pub mod repositories;
pub mod store;

pub use connection::*;
pub use memory::MemoryStore;
pub use models::*;
pub use pg_store::PgStore;
pub use store::{PollStore, StoreError};
