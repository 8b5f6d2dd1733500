//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::QuillConfig;
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "quill.toml";

/// Loads and validates `<dir>/quill.toml`.
pub fn load_config(dir: &Path) -> Result<QuillConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<QuillConfig, ConfigError> {
    let config: QuillConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &QuillConfig) -> Result<(), ConfigError> {
    let blank = [
        ("incremental.deps_dir", config.incremental.deps_dir.as_os_str().is_empty()),
        ("incremental.compiler_version", config.incremental.compiler_version.trim().is_empty()),
        ("log.filter", config.log.filter.as_deref().is_some_and(|f| f.trim().is_empty())),
    ];
    match blank.into_iter().find(|&(_, is_blank)| is_blank) {
        Some((field, _)) => Err(ConfigError::Blank { field }),
        None => Ok(()),
    }
}
