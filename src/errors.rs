// src/errors.rs

//! Crate-wide error type.
//!
//! Per-alias failures (`ExecutableNotFound`, `WorkingDirectoryResolution`,
//! `LaunchFailure`, `SignalDelivery`) are logged and isolated by the runner;
//! only group-level failures such as `UndefinedMember` abort a run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AliasError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    #[error("alias '{alias}': executable '{command}' not found")]
    ExecutableNotFound { alias: String, command: String },

    #[error("alias '{alias}' references undefined member(s): {}", missing.join(", "))]
    UndefinedMember { alias: String, missing: Vec<String> },

    #[error("alias '{alias}': cannot resolve working directory '{}': {source}", path.display())]
    WorkingDirectoryResolution {
        alias: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("alias '{alias}': failed to launch process: {source}")]
    LaunchFailure {
        alias: String,
        #[source]
        source: std::io::Error,
    },

    #[error("alias '{alias}': failed to deliver {signal}: {reason}")]
    SignalDelivery {
        alias: String,
        signal: String,
        reason: String,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AliasError>;
