// conflux-core/src/infrastructure/config/mod.rs

pub mod console;

pub use console::{ConsoleConfig, load_console_config};
