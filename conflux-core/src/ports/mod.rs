// conflux-core/src/ports/mod.rs

// Contracts the core needs from the outside world, without knowing how they are met.

pub mod metadata;
pub mod store;

pub use metadata::{MetadataError, MetadataProvider, fetch_key};
pub use store::{PersistenceError, RecordStore, StoredRecord};
