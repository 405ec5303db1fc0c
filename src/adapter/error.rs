//! Adapter error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the Codeception adapter.
///
/// Ambiguous runner output and unrecognized version text are never errors:
/// they degrade to "failed" and [`RunnerVersion::Unknown`](super::RunnerVersion)
/// respectively.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The runner configuration file could not be read.
    #[error("unable to read codeception config {path}: {source}")]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The runner configuration file is not valid YAML.
    #[error("the codeception config {path} could not be parsed: {source}")]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// Underlying YAML failure.
        #[source]
        source: serde_yaml::Error,
    },
    /// The runner executable could not be found.
    #[error("test framework executable not found: {0}")]
    ExecutableNotFound(String),
    /// The `--version` query could not be executed or exited unsuccessfully.
    #[error("failed to query the test framework version with `{command}`: {message}")]
    VersionResolution {
        /// Command line that was attempted.
        command: String,
        /// Exit status or spawn failure detail.
        message: String,
    },
    /// A mutation hash that cannot safely name files under the temp dir.
    #[error("invalid mutation hash {0:?}: must be non-empty and free of path separators")]
    InvalidMutationHash(String),
    /// IO failure, e.g. while persisting the interceptor shim.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
