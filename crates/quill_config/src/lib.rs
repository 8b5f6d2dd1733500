//! Parsing and validation of `quill.toml`.
//!
//! The file controls where dependency graphs are persisted, the compiler
//! version stamped into them, the dependency verifier, and the default log
//! filter. Every section is optional.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
