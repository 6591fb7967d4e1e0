// src/config/mod.rs

//! Alias configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the validated [`AliasSet`]
//!   (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate alias shapes and composite membership (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    AliasConfig, AliasDefinition, AliasSet, CompositeAlias, DEFAULT_GRACE_PERIOD, RawConfigFile,
    SettingsSection, SimpleAlias,
};
pub use validate::validate_members;
