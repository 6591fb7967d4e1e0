mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use aliases::config::{AliasDefinition, load_and_validate, load_from_path};
use aliases::errors::AliasError;
use aliases::types::AttachMode;
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

const DEV_CONFIG: &str = r#"
[settings]
grace_period = "750ms"

[alias.api]
desc = "API server"
command = "cargo"
args = "run --bin 'api server'"
args_array = ["--", "--port", "8080"]
working_directory = "backend"
environment = { RUST_LOG = "debug" }
background = true
restart = true

[alias.web]
desc = "Web frontend"
command = "npm"
args = "run dev"

[alias.migrate]
command = "sqlx"
args = "migrate run"

[alias.dev]
desc = "Everything for local development"
aliases = ["migrate", "api", "web"]
"#;

#[test]
fn loads_a_full_alias_file() -> TestResult {
    init_tracing();
    let file = write_config(DEV_CONFIG)?;

    let aliases = load_and_validate(file.path())?;

    assert_eq!(aliases.grace_period, Duration::from_millis(750));
    assert_eq!(aliases.len(), 4);

    let Some(AliasDefinition::Simple(api)) = aliases.get("api") else {
        panic!("api should be a simple alias");
    };
    assert_eq!(api.command, "cargo");
    assert_eq!(api.args, "run --bin 'api server'");
    assert_eq!(api.args_array, vec!["--", "--port", "8080"]);
    assert_eq!(api.working_directory, PathBuf::from("backend"));
    assert_eq!(api.environment.get("RUST_LOG").map(String::as_str), Some("debug"));
    assert_eq!(api.mode, AttachMode::Detached);
    assert!(api.restart);

    let Some(AliasDefinition::Simple(migrate)) = aliases.get("migrate") else {
        panic!("migrate should be a simple alias");
    };
    assert_eq!(migrate.mode, AttachMode::Attached);
    assert!(!migrate.restart);
    assert_eq!(migrate.working_directory, PathBuf::from("."));

    let Some(AliasDefinition::Composite(dev)) = aliases.get("dev") else {
        panic!("dev should be a composite alias");
    };
    assert_eq!(dev.members, vec!["migrate", "api", "web"]);

    Ok(())
}

#[test]
fn listing_only_shows_described_aliases_in_name_order() -> TestResult {
    let file = write_config(DEV_CONFIG)?;
    let aliases = load_and_validate(file.path())?;

    let names: Vec<&str> = aliases.described().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["api", "dev", "web"]);

    let picked = aliases.matching_prefix("de");
    assert_eq!(picked, vec![("dev", "Everything for local development")]);

    Ok(())
}

#[test]
fn missing_settings_use_the_default_grace_period() -> TestResult {
    let file = write_config(
        r#"
[alias.hello]
command = "echo"
args = "hi"
"#,
    )?;

    let aliases = load_and_validate(file.path())?;
    assert_eq!(aliases.grace_period, Duration::from_secs(5));
    Ok(())
}

#[test]
fn composite_with_undefined_member_still_loads() -> TestResult {
    let file = write_config(
        r#"
[alias.all]
aliases = ["ghost"]
"#,
    )?;

    let aliases = load_and_validate(file.path())?;
    assert!(matches!(aliases.get("all"), Some(AliasDefinition::Composite(_))));
    Ok(())
}

#[test]
fn rejects_alias_with_command_and_members() -> TestResult {
    let file = write_config(
        r#"
[alias.both]
command = "ls"
aliases = ["other"]
"#,
    )?;

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, AliasError::ConfigError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn rejects_nested_composites() -> TestResult {
    let file = write_config(
        r#"
[alias.leaf]
command = "true"

[alias.inner]
aliases = ["leaf"]

[alias.outer]
aliases = ["inner"]
"#,
    )?;

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, AliasError::ConfigError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let file = write_config("[alias.broken\ncommand = ")?;

    let err = load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, AliasError::TomlError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_and_validate(dir.path().join("Aliases.toml")).unwrap_err();
    assert!(matches!(err, AliasError::IoError(_)), "got {err:?}");
}
