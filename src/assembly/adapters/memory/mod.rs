//! In-memory adapters for every assembly port.

mod catalog;
mod replacement;
mod store;

pub use catalog::InMemoryJobCatalog;
pub use replacement::InMemoryReplacementOrderSink;
pub use store::InMemoryTaskStore;
