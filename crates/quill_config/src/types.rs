//! Configuration types deserialized from `quill.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The whole of `quill.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuillConfig {
    /// Where and how dependency graphs are persisted.
    #[serde(default)]
    pub incremental: IncrementalConfig,
    /// Dependency verifier settings.
    #[serde(default)]
    pub verify: VerifyConfig,
    /// Logging defaults.
    #[serde(default)]
    pub log: LogConfig,
}

/// The `[incremental]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncrementalConfig {
    /// Directory holding one dependency graph per source file.
    #[serde(default = "default_deps_dir")]
    pub deps_dir: PathBuf,
    /// Free-form version string written into every graph's metadata.
    #[serde(default = "default_compiler_version")]
    pub compiler_version: String,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self {
            deps_dir: default_deps_dir(),
            compiler_version: default_compiler_version(),
        }
    }
}

fn default_deps_dir() -> PathBuf {
    PathBuf::from(".quill-deps")
}

fn default_compiler_version() -> String {
    format!("quill {}", env!("CARGO_PKG_VERSION"))
}

/// The `[verify]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    /// Apply suggested fix-its to the verified sources.
    #[serde(default)]
    pub auto_fix: bool,
    /// Files to verify when none are given on the command line.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// The `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// A `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}
