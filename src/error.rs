//! Error types for the build engine.
//!
//! Every variant is fatal: the build stops at the first error and nothing is
//! retried. The CLI layer wraps these in `anyhow` for reporting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to scan project tree at {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read source file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Non-zero exit or any output on the error channel.
    #[error("Command Failed: {command}\n{stderr}")]
    Toolchain { command: String, stderr: String },

    #[error("unsupported value `{value}` for configuration key `{key}`")]
    UnsupportedConfigValue { key: String, value: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid exclusion pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl BuildError {
    /// True for failures that came out of a compiler/linker invocation.
    pub fn is_toolchain_failure(&self) -> bool {
        matches!(self, BuildError::Toolchain { .. } | BuildError::Spawn { .. })
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
