// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, Selection};
use crate::config::{AliasDefinition, AliasSet, load_and_validate};
use crate::engine::{Supervisor, SupervisorOptions};
use crate::exec::LaunchSpec;

/// Exit code used when the requested alias does not exist.
pub const EXIT_UNKNOWN_ALIAS: i32 = 66;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - alias selection (run, list, prefix pick)
/// - the supervisor, which owns process launch, restart and shutdown
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = &args.config;
    let aliases = load_and_validate(config_path)?;
    debug!(path = %config_path.display(), aliases = aliases.len(), "loaded alias file");

    if args.list {
        print_described(&aliases, "");
        return Ok(0);
    }

    let name = match Selection::from_arg(args.alias.as_deref()) {
        Selection::Pick(prefix) => {
            print_described(&aliases, &prefix);
            return Ok(0);
        }
        Selection::Run(name) => name,
    };

    if !aliases.contains(&name) {
        eprintln!("unknown alias '{name}'");
        print_described(&aliases, "");
        return Ok(EXIT_UNKNOWN_ALIAS);
    }

    if args.dry_run {
        print_dry_run(&aliases, &name);
        return Ok(0);
    }

    let options = SupervisorOptions {
        grace_period: aliases.grace_period,
        ..SupervisorOptions::default()
    };
    let supervisor = Supervisor::new(aliases, options);
    let code = supervisor.run(&name).await?;
    Ok(code)
}

/// Print `name: description` lines for described aliases matching `prefix`.
fn print_described(aliases: &AliasSet, prefix: &str) {
    let described = aliases.matching_prefix(prefix);
    let width = described.iter().map(|(name, _)| name.len()).max().unwrap_or(0) + 1;

    for (name, desc) in described {
        eprintln!("{name:<width$}: {desc}");
    }
}

/// Dry-run output: resolve every alias that would be launched.
fn print_dry_run(aliases: &AliasSet, name: &str) {
    println!("aliases dry-run");
    println!("  grace_period = {:?}", aliases.grace_period);
    println!();

    let members: Vec<&str> = match aliases.get(name) {
        Some(AliasDefinition::Composite(composite)) => {
            println!("{name} = [{}]", composite.members.join(", "));
            composite.members.iter().map(String::as_str).collect()
        }
        _ => vec![name],
    };

    for member in members {
        println!("  - {member}");
        let Some(AliasDefinition::Simple(simple)) = aliases.get(member) else {
            println!("      (undefined)");
            continue;
        };

        match LaunchSpec::prepare(simple) {
            Ok(spec) => {
                println!("      argv: {}", spec.display_command());
                println!("      cwd: {}", spec.working_directory.display());
                if !spec.environment.is_empty() {
                    println!("      env: {:?}", spec.environment);
                }
                println!("      mode: {}", spec.mode.tag());
                if spec.restart {
                    println!("      restart: true");
                }
                if !spec.inherit_stdin {
                    println!("      stdin: not inherited");
                }
            }
            Err(e) => println!("      error: {e}"),
        }
    }

    debug!("dry-run complete (no execution)");
}
