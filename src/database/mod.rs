pub mod connection;
pub mod memory;
pub mod postgres;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::*;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{RecordStore, SharedStore};
