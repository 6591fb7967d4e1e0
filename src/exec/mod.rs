// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands defined by
//! simple aliases, using `tokio::process::Command`, and reporting back to the
//! supervisor via its registry and `SupervisorEvent`s.
//!
//! - [`tokenizer`] splits the raw `args` string into words.
//! - [`lookup`] resolves the executable on `PATH`.
//! - [`command`] turns an alias into a [`LaunchSpec`] (argv, environment,
//!   working directory, stdin policy).
//! - [`process`] wraps one launched OS process and its termination requests.
//! - [`runner`] runs an alias attached or detached and applies its restart
//!   policy.

pub mod command;
pub mod lookup;
pub mod process;
pub mod runner;
pub mod tokenizer;

pub use command::LaunchSpec;
pub use process::{ProcessHandle, ProcessState};
pub use runner::AliasRunner;
pub use tokenizer::tokenize;
