//! Why a `quill.toml` could not be used.

use std::path::PathBuf;

/// A configuration file that could not be read or does not describe a
/// usable incremental setup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists in name only: it could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Not TOML, or a key this version does not know.
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting that must name something was left blank.
    #[error("`{field}` must not be blank")]
    Blank {
        /// Dotted path of the setting, e.g. `incremental.deps_dir`.
        field: &'static str,
    },
}
