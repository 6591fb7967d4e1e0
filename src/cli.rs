// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `aliases`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "aliases",
    version,
    about = "Run named command aliases as one supervised group.",
    long_about = None
)]
pub struct CliArgs {
    /// Alias to run.
    ///
    /// Omit it, or end it with `*`, to list the matching aliases instead.
    #[arg(value_name = "ALIAS")]
    pub alias: Option<String>,

    /// Path to the alias file (TOML).
    ///
    /// Default: `Aliases.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ALIASES_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print every alias that has a description, then exit.
    #[arg(long)]
    pub list: bool,

    /// Resolve the selected alias and print what would be launched, without
    /// starting anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// What the positional argument asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// List described aliases starting with this prefix.
    Pick(String),
    /// Run exactly this alias.
    Run(String),
}

impl Selection {
    /// No argument is an empty pick; a trailing `*` turns a name into a
    /// prefix pick.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Selection::Pick(String::new()),
            Some(name) => match name.strip_suffix('*') {
                Some(prefix) => Selection::Pick(prefix.to_string()),
                None => Selection::Run(name.to_string()),
            },
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_from_positional_argument() {
        assert_eq!(Selection::from_arg(None), Selection::Pick(String::new()));
        assert_eq!(Selection::from_arg(Some("dev*")), Selection::Pick("dev".into()));
        assert_eq!(Selection::from_arg(Some("*")), Selection::Pick(String::new()));
        assert_eq!(Selection::from_arg(Some("dev")), Selection::Run("dev".into()));
    }

    #[test]
    fn parses_flags() {
        let args = CliArgs::parse_from(["aliases", "--config", "x.toml", "--dry-run", "web"]);
        assert_eq!(args.alias.as_deref(), Some("web"));
        assert_eq!(args.config, PathBuf::from("x.toml"));
        assert!(args.dry_run);
        assert!(!args.list);
    }

    #[test]
    fn config_defaults_to_the_alias_file_in_the_working_directory() {
        let args = CliArgs::parse_from(["aliases"]);
        assert_eq!(args.config, default_config_path());
        assert_eq!(args.config, PathBuf::from("Aliases.toml"));
    }
}
