//! Errors raised while loading, saving and editing the configuration file.

use std::path::PathBuf;

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The home directory holding `.bifrost/config.toml` could not be determined.
    #[error("failed to get home directory. does your os support `std::env::home_dir()`?")]
    NoHomeDirectory,

    /// The configuration path is not valid UTF-8.
    #[error("configuration path {0:?} is not valid utf-8")]
    InvalidPath(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("failed to read {path:?}: {reason}")]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// Why reading failed.
        reason: String,
    },

    /// The configuration file could not be written or deleted.
    #[error("failed to write {path:?}: {reason}")]
    Write {
        /// The configuration file.
        path: PathBuf,
        /// Why writing failed.
        reason: String,
    },

    /// The configuration file is not valid TOML for a [`Configuration`](crate::Configuration).
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `bifrost config` was given a key the configuration does not have.
    #[error("invalid key: '{0}' is not a valid configuration key")]
    UnknownKey(String),

    /// The revision is not a known protocol revision name.
    #[error("unknown revision '{0}'")]
    InvalidRevision(String),

    /// Top-level executions need some gas to run.
    #[error("the gas limit must be positive, got {0}")]
    InvalidGasLimit(i64),

    /// A value that does not parse as the type of its key.
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The rejected value.
        value: String,
        /// Why the value does not parse.
        reason: String,
    },
}
