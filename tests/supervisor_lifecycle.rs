#![cfg(unix)]

mod common;
use crate::common::builders::{AliasBuilder, AliasSetBuilder};
use crate::common::{EventRecorder, init_tracing, options, with_timeout};

use std::error::Error;
use std::time::{Duration, Instant};

use aliases::engine::{Supervisor, SupervisorEvent};
use aliases::errors::AliasError;
use aliases::types::ExitState;

type TestResult = Result<(), Box<dyn Error>>;

const GRACE: Duration = Duration::from_millis(300);

#[tokio::test]
async fn attached_alias_blocks_until_its_process_exits() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("nap", "sleep").args("1").build())
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let started = Instant::now();
    let code = with_timeout(supervisor.run("nap")).await?;
    let elapsed = started.elapsed();

    assert_eq!(code, 0);
    assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "returned after {elapsed:?}");

    recorder
        .wait_until(|events| {
            events
                .iter()
                .any(|e| matches!(e, SupervisorEvent::ProcessExited { .. }))
        })
        .await;
    let exits = recorder.exits("nap");
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].0, ExitState::Success);
    assert!(!supervisor.is_stopping());

    Ok(())
}

#[tokio::test]
async fn failing_process_reports_its_exit_code_without_failing_the_run() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("boom", "sh").args("-c 'exit 3'").build())
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let code = with_timeout(supervisor.run("boom")).await?;
    assert_eq!(code, 0);

    recorder
        .wait_until(|events| {
            events
                .iter()
                .any(|e| matches!(e, SupervisorEvent::ProcessExited { .. }))
        })
        .await;
    assert_eq!(recorder.exits("boom")[0].0, ExitState::Failed(3));

    Ok(())
}

#[tokio::test]
async fn attached_member_blocks_later_members() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("first", "sleep").args("0.5").build())
        .with_alias(AliasBuilder::new("second", "true").detached().build())
        .with_composite("both", &["first", "second"])
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let code = with_timeout(supervisor.run("both")).await?;
    assert_eq!(code, 0);

    recorder.wait_for_starts("second", 1).await;
    let first_exit = recorder.exits("first")[0].1;
    let second_start = recorder.starts("second")[0].1;
    assert!(
        second_start >= first_exit,
        "second started before first exited"
    );

    Ok(())
}

#[tokio::test]
async fn detached_members_start_without_waiting() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("slow", "sleep").args("1").detached().build())
        .with_alias(AliasBuilder::new("fast", "true").build())
        .with_composite("both", &["slow", "fast"])
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let started = Instant::now();
    let code = with_timeout(supervisor.run("both")).await?;
    assert_eq!(code, 0);
    // The run still waits for the detached member.
    assert!(started.elapsed() >= Duration::from_millis(900));

    recorder.wait_for_starts("fast", 1).await;
    recorder
        .wait_until(|events| {
            events
                .iter()
                .any(|e| matches!(e, SupervisorEvent::ProcessExited { alias, .. } if alias == "slow"))
        })
        .await;
    let fast_start = recorder.starts("fast")[0].1;
    let slow_exit = recorder.exits("slow")[0].1;
    assert!(fast_start < slow_exit, "fast should not wait for slow");

    Ok(())
}

#[tokio::test]
async fn undefined_member_starts_nothing() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("real", "sleep").args("5").detached().build())
        .with_composite("broken", &["real", "ghost"])
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let err = with_timeout(supervisor.run("broken")).await.unwrap_err();
    match err {
        AliasError::UndefinedMember { alias, missing } => {
            assert_eq!(alias, "broken");
            assert_eq!(missing, vec!["ghost".to_string()]);
        }
        other => panic!("expected UndefinedMember, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(supervisor.registry().snapshot().is_empty());
    assert_eq!(
        recorder.count(|e| matches!(e, SupervisorEvent::ProcessStarted { .. })),
        0
    );

    Ok(())
}

#[tokio::test]
async fn unknown_alias_is_reported() {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("real", "true").build())
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));

    let err = with_timeout(supervisor.run("nope")).await.unwrap_err();
    assert!(matches!(err, AliasError::AliasNotFound(name) if name == "nope"));
}

#[tokio::test]
async fn missing_executable_does_not_stop_siblings() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(
            AliasBuilder::new("ghost-bin", "definitely-not-a-real-binary-7f3a")
                .detached()
                .build(),
        )
        .with_alias(AliasBuilder::new("ok", "true").build())
        .with_composite("mixed", &["ghost-bin", "ok"])
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let code = with_timeout(supervisor.run("mixed")).await?;
    assert_eq!(code, 0);

    recorder.wait_for_starts("ok", 1).await;
    let failures = recorder.count(
        |e| matches!(e, SupervisorEvent::LaunchFailed { alias, .. } if alias == "ghost-bin"),
    );
    assert_eq!(failures, 1);
    assert!(recorder.starts("ghost-bin").is_empty());

    Ok(())
}

#[tokio::test]
async fn missing_working_directory_is_a_launch_failure() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let aliases = AliasSetBuilder::new()
        .with_alias(
            AliasBuilder::new("lost", "true")
                .working_directory(dir.path().join("does-not-exist"))
                .build(),
        )
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    let code = with_timeout(supervisor.run("lost")).await?;
    assert_eq!(code, 0);

    recorder
        .wait_until(|events| {
            events
                .iter()
                .any(|e| matches!(e, SupervisorEvent::LaunchFailed { alias, .. } if alias == "lost"))
        })
        .await;
    assert!(supervisor.registry().handles_for("lost").iter().all(|h| h.is_terminal()));

    Ok(())
}

#[tokio::test]
async fn environment_and_working_directory_reach_the_child() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let aliases = AliasSetBuilder::new()
        .with_alias(
            AliasBuilder::new("probe", "sh")
                .args(r#"-c 'pwd > out.txt; echo "$GREETING" >> out.txt'"#)
                .working_directory(dir.path())
                .env("GREETING", "hello from aliases")
                .build(),
        )
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));

    with_timeout(supervisor.run("probe")).await?;

    let output = std::fs::read_to_string(dir.path().join("out.txt"))?;
    let mut lines = output.lines();
    let pwd = std::fs::canonicalize(lines.next().unwrap_or_default())?;
    assert_eq!(pwd, std::fs::canonicalize(dir.path())?);
    assert_eq!(lines.next(), Some("hello from aliases"));

    Ok(())
}

#[tokio::test]
async fn args_array_is_appended_verbatim() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let aliases = AliasSetBuilder::new()
        .with_alias(
            AliasBuilder::new("echoer", "sh")
                .args("-c 'printf \"%s|\" \"$@\" > args.txt' sh")
                .arg("one two")
                .arg("'three'")
                .working_directory(dir.path())
                .build(),
        )
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));

    with_timeout(supervisor.run("echoer")).await?;

    let output = std::fs::read_to_string(dir.path().join("args.txt"))?;
    assert_eq!(output, "one two|'three'|");

    Ok(())
}

#[tokio::test]
async fn restart_policy_relaunches_exactly_once_per_exit() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(
            AliasBuilder::new("flaky", "sh")
                .args("-c 'sleep 0.1; exit 1'")
                .detached()
                .restart(true)
                .build(),
        )
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());
    let trigger = supervisor.shutdown_trigger();

    let (code, ()) = with_timeout(async {
        tokio::join!(supervisor.run("flaky"), async {
            recorder.wait_for_starts("flaky", 3).await;
            trigger.trigger("test").await;
        })
    })
    .await;
    assert_eq!(code?, 0);

    let generations: Vec<u32> = recorder.starts("flaky").into_iter().map(|(g, _)| g).collect();
    let expected: Vec<u32> = (0..generations.len() as u32).collect();
    assert_eq!(generations, expected, "one launch per generation, in order");

    // Every exit before the shutdown was followed by exactly one relaunch;
    // only an exit racing the shutdown itself may go without one.
    let shutdown_at = recorder.shutdown_starts()[0];
    let exits_before = recorder
        .exits("flaky")
        .into_iter()
        .filter(|(_, at)| *at < shutdown_at)
        .count();
    let starts_after_first = recorder
        .starts("flaky")
        .into_iter()
        .skip(1)
        .filter(|(_, at)| *at < shutdown_at)
        .count();
    assert!(
        exits_before == starts_after_first || exits_before == starts_after_first + 1,
        "{exits_before} exits vs {starts_after_first} relaunches"
    );

    let late_starts = recorder
        .starts("flaky")
        .into_iter()
        .filter(|(_, at)| *at > shutdown_at)
        .count();
    assert_eq!(late_starts, 0, "nothing launches once stopping");

    Ok(())
}

#[tokio::test]
async fn without_restart_an_exit_is_final() -> TestResult {
    init_tracing();
    let aliases = AliasSetBuilder::new()
        .with_alias(AliasBuilder::new("once", "sh").args("-c 'exit 1'").detached().build())
        .build();
    let supervisor = Supervisor::new(aliases, options(GRACE));
    let recorder = EventRecorder::start(supervisor.subscribe());

    with_timeout(supervisor.run("once")).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(recorder.starts("once").len(), 1);
    assert_eq!(
        recorder.count(|e| matches!(e, SupervisorEvent::Restarting { .. })),
        0
    );

    Ok(())
}
