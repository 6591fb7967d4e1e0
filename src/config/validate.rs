use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{
    AliasConfig, AliasDefinition, AliasSet, CompositeAlias, DEFAULT_GRACE_PERIOD, RawConfigFile,
    SimpleAlias,
};
use crate::errors::{AliasError, Result};
use crate::types::{AttachMode, parse_duration};

impl TryFrom<RawConfigFile> for AliasSet {
    type Error = AliasError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let grace_period = grace_period_from(raw.settings.grace_period.as_deref())?;

        let mut definitions = Vec::with_capacity(raw.alias.len());
        for (name, alias) in raw.alias {
            definitions.push(definition_from_config(name, alias)?);
        }

        AliasSet::from_definitions(grace_period, definitions)
    }
}

impl AliasSet {
    /// Build a set from already-shaped definitions.
    ///
    /// Composite members that do exist must be simple aliases. Missing
    /// members are left for the dispatcher, which reports them with
    /// [`validate_members`] before launching anything.
    pub fn from_definitions(
        grace_period: Duration,
        definitions: impl IntoIterator<Item = AliasDefinition>,
    ) -> Result<Self> {
        let aliases: BTreeMap<String, AliasDefinition> = definitions
            .into_iter()
            .map(|def| (def.name().to_string(), def))
            .collect();

        validate_composites(&aliases)?;
        Ok(AliasSet::new_unchecked(grace_period, aliases))
    }
}

/// Check that every named member of `composite` is defined.
///
/// All missing names are reported together so a group is never partially
/// started.
pub fn validate_members(
    composite: &CompositeAlias,
    is_defined: impl Fn(&str) -> bool,
) -> Result<()> {
    let missing: Vec<String> = composite
        .members
        .iter()
        .filter(|member| !is_defined(member.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AliasError::UndefinedMember {
            alias: composite.name.clone(),
            missing,
        })
    }
}

fn validate_composites(aliases: &BTreeMap<String, AliasDefinition>) -> Result<()> {
    for def in aliases.values() {
        let AliasDefinition::Composite(composite) = def else {
            continue;
        };

        for member in composite.members.iter() {
            if let Some(AliasDefinition::Composite(_)) = aliases.get(member) {
                return Err(AliasError::ConfigError(format!(
                    "alias '{}' lists composite alias '{}' as a member; members must run a command",
                    composite.name, member
                )));
            }
        }
    }
    Ok(())
}

fn grace_period_from(value: Option<&str>) -> Result<Duration> {
    match value {
        None => Ok(DEFAULT_GRACE_PERIOD),
        Some(s) => parse_duration(s).map_err(|e| {
            AliasError::ConfigError(format!("[settings].grace_period: {e}"))
        }),
    }
}

fn definition_from_config(name: String, alias: AliasConfig) -> Result<AliasDefinition> {
    match (alias.command, alias.aliases) {
        (Some(_), Some(_)) => Err(AliasError::ConfigError(format!(
            "alias '{name}' cannot define both `command` and `aliases`"
        ))),
        (None, None) => Err(AliasError::ConfigError(format!(
            "alias '{name}' must define either `command` or `aliases`"
        ))),
        (None, Some(members)) => Ok(AliasDefinition::Composite(CompositeAlias {
            name,
            description: alias.desc,
            members,
        })),
        (Some(command), None) => Ok(AliasDefinition::Simple(SimpleAlias {
            name,
            description: alias.desc,
            command,
            args: alias.args,
            args_array: alias.args_array,
            working_directory: alias
                .working_directory
                .unwrap_or_else(|| PathBuf::from(".")),
            environment: alias.environment,
            mode: AttachMode::from_background(alias.background),
            restart: alias.restart,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<AliasSet> {
        let raw: RawConfigFile = toml::from_str(src)?;
        AliasSet::try_from(raw)
    }

    #[test]
    fn simple_alias_defaults() {
        let set = parse(
            r#"
            [alias.web]
            command = "sleep"
            args = "1"
            "#,
        )
        .expect("valid config");

        let Some(AliasDefinition::Simple(web)) = set.get("web") else {
            panic!("web should be a simple alias");
        };
        assert_eq!(web.mode, AttachMode::Attached);
        assert!(!web.restart);
        assert_eq!(web.working_directory, PathBuf::from("."));
        assert_eq!(set.grace_period, DEFAULT_GRACE_PERIOD);
    }

    #[test]
    fn composite_with_missing_members_lists_all_of_them() {
        let set = parse(
            r#"
            [alias.a]
            command = "true"

            [alias.group]
            aliases = ["a", "ghost", "phantom"]
            "#,
        )
        .expect("membership is checked at dispatch time");

        let Some(AliasDefinition::Composite(group)) = set.get("group") else {
            panic!("group should be a composite alias");
        };
        let err = validate_members(group, |name| set.contains(name)).unwrap_err();

        match err {
            AliasError::UndefinedMember { alias, missing } => {
                assert_eq!(alias, "group");
                assert_eq!(missing, vec!["ghost".to_string(), "phantom".to_string()]);
            }
            other => panic!("expected UndefinedMember, got {other:?}"),
        }
    }

    #[test]
    fn command_and_members_are_mutually_exclusive() {
        let err = parse(
            r#"
            [alias.both]
            command = "true"
            aliases = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AliasError::ConfigError(_)));

        let err = parse("[alias.neither]\n").unwrap_err();
        assert!(matches!(err, AliasError::ConfigError(_)));
    }

    #[test]
    fn nested_composites_are_rejected() {
        let err = parse(
            r#"
            [alias.a]
            command = "true"

            [alias.inner]
            aliases = ["a"]

            [alias.outer]
            aliases = ["inner"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AliasError::ConfigError(_)));
    }

    #[test]
    fn grace_period_is_parsed_from_settings() {
        let set = parse(
            r#"
            [settings]
            grace_period = "750ms"

            [alias.a]
            command = "true"
            "#,
        )
        .expect("valid config");
        assert_eq!(set.grace_period, Duration::from_millis(750));

        let err = parse("[settings]\ngrace_period = \"soon\"\n").unwrap_err();
        assert!(matches!(err, AliasError::ConfigError(_)));
    }

    #[test]
    fn oversized_grace_period_is_a_config_error() {
        let err = parse("[settings]\ngrace_period = \"9999999999999999h\"\n").unwrap_err();
        assert!(matches!(err, AliasError::ConfigError(_)), "got {err:?}");
    }
}
