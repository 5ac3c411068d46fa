// conflux-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;

pub use adapters::{YamlCatalog, YamlRecordStore};
pub use config::{ConsoleConfig, load_console_config};
