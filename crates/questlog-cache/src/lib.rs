// Durable local key-value storage
// Progress lives here between sessions

pub mod error;
pub mod memory;
pub mod store;

pub use error::{CacheError, Result};
pub use memory::MemoryStore;
pub use store::{KeyValueStore, SqliteStore};
