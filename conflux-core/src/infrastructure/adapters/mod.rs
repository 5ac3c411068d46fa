// conflux-core/src/infrastructure/adapters/mod.rs

pub mod catalog;
pub mod store;

pub use catalog::YamlCatalog;
pub use store::YamlRecordStore;
