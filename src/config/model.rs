// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::AttachMode;

/// Default grace period between SIGTERM and SIGKILL during shutdown.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [settings]
/// grace_period = "5s"
///
/// [alias.web]
/// desc = "Run the dev server"
/// command = "npm"
/// args = "run dev"
/// working_directory = "web"
/// environment = { PORT = "8080" }
/// background = true
/// restart = true
///
/// [alias.all]
/// desc = "Everything"
/// aliases = ["web", "api"]
/// ```
///
/// All sections are optional; validation happens in
/// [`AliasSet::try_from`](crate::config::AliasSet).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub settings: SettingsSection,

    /// All aliases from `[alias.<name>]`, keyed by alias name.
    #[serde(default)]
    pub alias: BTreeMap<String, AliasConfig>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SettingsSection {
    /// Duration string (e.g. `"5s"`) waited after the graceful termination
    /// request before escalating to a forceful kill.
    #[serde(default)]
    pub grace_period: Option<String>,
}

/// `[alias.<name>]` section, exactly as written in the file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AliasConfig {
    /// Description shown in listings. Aliases without one are hidden.
    #[serde(default)]
    pub desc: Option<String>,

    /// Executable name or path, looked up on `PATH`.
    #[serde(default)]
    pub command: Option<String>,

    /// Raw argument string, split with single/double quote handling.
    #[serde(default)]
    pub args: String,

    /// Explicit argument list appended verbatim after `args`.
    #[serde(default)]
    pub args_array: Vec<String>,

    /// Working directory relative to the supervisor's own.
    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Run detached when true.
    #[serde(default)]
    pub background: bool,

    #[serde(default)]
    pub restart: bool,

    /// Member alias names; makes this a composite alias.
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
}

/// An alias that launches its own executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleAlias {
    pub name: String,
    pub description: Option<String>,
    pub command: String,
    pub args: String,
    pub args_array: Vec<String>,
    pub working_directory: PathBuf,
    pub environment: BTreeMap<String, String>,
    pub mode: AttachMode,
    pub restart: bool,
}

impl SimpleAlias {
    /// Attached, non-restarting alias with no arguments.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            command: command.into(),
            args: String::new(),
            args_array: Vec::new(),
            working_directory: PathBuf::from("."),
            environment: BTreeMap::new(),
            mode: AttachMode::Attached,
            restart: false,
        }
    }
}

/// An alias whose definition is a list of other aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeAlias {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

/// A validated alias definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasDefinition {
    Simple(SimpleAlias),
    Composite(CompositeAlias),
}

impl AliasDefinition {
    pub fn name(&self) -> &str {
        match self {
            AliasDefinition::Simple(s) => &s.name,
            AliasDefinition::Composite(c) => &c.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            AliasDefinition::Simple(s) => s.description.as_deref(),
            AliasDefinition::Composite(c) => c.description.as_deref(),
        }
    }
}

/// The resolved, validated set of aliases the supervisor runs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    pub grace_period: Duration,
    aliases: BTreeMap<String, AliasDefinition>,
}

impl AliasSet {
    /// Construct without validation. Use `AliasSet::try_from(RawConfigFile)`
    /// or [`AliasSet::from_definitions`] for checked construction.
    pub(crate) fn new_unchecked(
        grace_period: Duration,
        aliases: BTreeMap<String, AliasDefinition>,
    ) -> Self {
        Self {
            grace_period,
            aliases,
        }
    }

    pub fn get(&self, name: &str) -> Option<&AliasDefinition> {
        self.aliases.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Aliases with a description, sorted by name.
    pub fn described(&self) -> Vec<(&str, &str)> {
        self.aliases
            .iter()
            .filter_map(|(name, def)| def.description().map(|d| (name.as_str(), d)))
            .collect()
    }

    /// Described aliases whose name starts with `prefix`.
    pub fn matching_prefix(&self, prefix: &str) -> Vec<(&str, &str)> {
        self.described()
            .into_iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .collect()
    }
}
