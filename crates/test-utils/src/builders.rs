#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use aliases::config::{AliasDefinition, AliasSet, CompositeAlias, SimpleAlias};
use aliases::types::AttachMode;

/// Builder for `AliasSet` to simplify test setup.
pub struct AliasSetBuilder {
    grace_period: Duration,
    definitions: Vec<AliasDefinition>,
}

impl AliasSetBuilder {
    pub fn new() -> Self {
        Self {
            grace_period: Duration::from_millis(500),
            definitions: Vec::new(),
        }
    }

    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_alias(mut self, alias: SimpleAlias) -> Self {
        self.definitions.push(AliasDefinition::Simple(alias));
        self
    }

    pub fn with_composite(mut self, name: &str, members: &[&str]) -> Self {
        self.definitions.push(AliasDefinition::Composite(CompositeAlias {
            name: name.to_string(),
            description: None,
            members: members.iter().map(|m| m.to_string()).collect(),
        }));
        self
    }

    pub fn build(self) -> AliasSet {
        AliasSet::from_definitions(self.grace_period, self.definitions)
            .expect("Failed to build valid alias set from builder")
    }
}

impl Default for AliasSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SimpleAlias`.
pub struct AliasBuilder {
    alias: SimpleAlias,
}

impl AliasBuilder {
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            alias: SimpleAlias::new(name, command),
        }
    }

    pub fn args(mut self, args: &str) -> Self {
        self.alias.args = args.to_string();
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.alias.args_array.push(arg.to_string());
        self
    }

    pub fn working_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.alias.working_directory = dir.as_ref().to_path_buf();
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.alias
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn detached(mut self) -> Self {
        self.alias.mode = AttachMode::Detached;
        self
    }

    pub fn restart(mut self, val: bool) -> Self {
        self.alias.restart = val;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.alias.description = Some(desc.to_string());
        self
    }

    pub fn build(self) -> SimpleAlias {
        self.alias
    }
}
