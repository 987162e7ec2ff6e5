//! objectives-store: Progress persistence and configuration.
//!
//! Implements the `ProgressStore` trait for a JSON file and for memory, and
//! loads the TOML configuration that decides which store and definitions a
//! front end uses.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;

pub use config::{create_store, load_config_from, GateConfig};
pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
