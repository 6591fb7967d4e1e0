// src/exec/command.rs

//! Materialising a [`SimpleAlias`] into a concrete launch description.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::SimpleAlias;
use crate::errors::{AliasError, Result};
use crate::exec::lookup::resolve_executable;
use crate::exec::tokenizer::tokenize;
use crate::types::AttachMode;

/// Everything needed to start (and restart) one alias's process.
///
/// Built once per alias run; every restart reuses the same spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub alias: String,
    pub executable: PathBuf,
    /// Full argument vector; `argv[0]` is the resolved executable path.
    pub argv: Vec<String>,
    /// Overrides layered on top of the inherited environment.
    pub environment: BTreeMap<String, String>,
    pub working_directory: PathBuf,
    pub inherit_stdin: bool,
    pub mode: AttachMode,
    pub restart: bool,
}

impl LaunchSpec {
    /// Resolve the executable, arguments and working directory of `alias`
    /// relative to the supervisor's current directory.
    pub fn prepare(alias: &SimpleAlias) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| {
            AliasError::WorkingDirectoryResolution {
                alias: alias.name.clone(),
                path: alias.working_directory.clone(),
                source,
            }
        })?;
        Self::prepare_in(alias, &cwd)
    }

    /// Same as [`LaunchSpec::prepare`] with an explicit base directory.
    pub fn prepare_in(alias: &SimpleAlias, base_dir: &Path) -> Result<Self> {
        let executable = resolve_executable(&alias.command, base_dir).ok_or_else(|| {
            AliasError::ExecutableNotFound {
                alias: alias.name.clone(),
                command: alias.command.clone(),
            }
        })?;

        let working_directory = std::path::absolute(base_dir.join(&alias.working_directory))
            .map_err(|source| AliasError::WorkingDirectoryResolution {
                alias: alias.name.clone(),
                path: alias.working_directory.clone(),
                source,
            })?;

        let argv = build_argv(&executable, &alias.args, &alias.args_array);
        let inherit_stdin = inherits_stdin(&executable);

        Ok(Self {
            alias: alias.name.clone(),
            executable,
            argv,
            environment: alias.environment.clone(),
            working_directory,
            inherit_stdin,
            mode: alias.mode,
            restart: alias.restart,
        })
    }

    /// Build the Tokio command for one launch.
    ///
    /// stdout/stderr are always inherited; stdin only when
    /// [`LaunchSpec::inherit_stdin`] is set.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(self.argv.iter().skip(1))
            .envs(&self.environment)
            .current_dir(&self.working_directory)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if self.inherit_stdin {
            cmd.stdin(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null());
        }

        cmd
    }

    /// Human-readable command line, quoted per word.
    pub fn display_command(&self) -> String {
        format!("'{}'", self.argv.join("' '"))
    }
}

/// `[executable] + tokenize(raw_args) + explicit_args`.
pub fn build_argv(executable: &Path, raw_args: &str, explicit_args: &[String]) -> Vec<String> {
    let mut argv = Vec::with_capacity(1 + explicit_args.len());
    argv.push(executable.to_string_lossy().into_owned());
    argv.extend(tokenize(raw_args));
    argv.extend(explicit_args.iter().cloned());
    argv
}

/// Command-interpreter script wrappers (`*.cmd`, `*.bat`) misbehave with a
/// shared input stream, so they never get the supervisor's stdin.
pub fn inherits_stdin(executable: &Path) -> bool {
    let lowered = executable.to_string_lossy().to_lowercase();
    !(lowered.ends_with("cmd") || lowered.ends_with("bat"))
}
