use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{AliasSet, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** check alias
/// definitions. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it into an [`AliasSet`].
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - aliases with both or neither of `command` / `aliases`,
///   - composite members that are composites themselves,
///   - a malformed `[settings].grace_period`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<AliasSet> {
    let raw_config = load_from_path(&path)?;
    AliasSet::try_from(raw_config)
}

/// `Aliases.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Aliases.toml")
}
