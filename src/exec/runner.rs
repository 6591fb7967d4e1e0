// src/exec/runner.rs

//! Running one simple alias, including its restart policy.

use std::sync::Arc;
use std::time::Instant;

use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SimpleAlias;
use crate::engine::{CompletionToken, SupervisorContext, SupervisorEvent};
use crate::errors::Result;
use crate::exec::command::LaunchSpec;
use crate::exec::process::ProcessHandle;

/// Materialises one [`SimpleAlias`] into processes.
///
/// The runner holds a completion token for its whole life, so the
/// supervisor keeps waiting until the alias has exited for good: either it
/// has no restart policy, or the supervisor is stopping.
#[derive(Debug)]
pub struct AliasRunner {
    spec: LaunchSpec,
    ctx: Arc<SupervisorContext>,
    _token: CompletionToken,
}

impl AliasRunner {
    /// Resolve `alias` and join the supervisor's completion barrier.
    ///
    /// Fails with `ExecutableNotFound` or `WorkingDirectoryResolution`;
    /// neither leaves anything registered with the barrier.
    pub fn prepare(alias: &SimpleAlias, ctx: Arc<SupervisorContext>) -> Result<Self> {
        let spec = LaunchSpec::prepare(alias)?;
        Ok(Self::from_spec(spec, ctx))
    }

    pub fn from_spec(spec: LaunchSpec, ctx: Arc<SupervisorContext>) -> Self {
        let token = ctx.completion.token();
        Self {
            spec,
            ctx,
            _token: token,
        }
    }

    /// Launch and block until the alias is finished, restarts included.
    pub async fn run_attached(self) {
        let first = self.launch(0);
        self.supervise(first).await;
    }

    /// Launch, then wait (and restart) in a background task.
    ///
    /// The first process is already registered when this returns.
    pub fn start_detached(self) -> JoinHandle<()> {
        let first = self.launch(0);
        tokio::spawn(self.supervise(first))
    }

    fn launch(&self, generation: u32) -> Option<(Arc<ProcessHandle>, Child)> {
        let spec = &self.spec;
        match self.ctx.registry.launch(spec, generation) {
            Ok(Some((handle, child))) => {
                info!(
                    alias = %spec.alias,
                    pid = ?handle.pid(),
                    cwd = %spec.working_directory.display(),
                    env = ?spec.environment,
                    restart = handle.restart_eligible(),
                    mode = spec.mode.tag(),
                    "$ {}",
                    spec.display_command()
                );
                if !spec.inherit_stdin {
                    debug!(alias = %spec.alias, executable = %spec.executable.display(), "stdin not inherited");
                }
                self.ctx.publish(SupervisorEvent::ProcessStarted {
                    alias: spec.alias.clone(),
                    pid: handle.pid(),
                    generation,
                    at: Instant::now(),
                });
                Some((handle, child))
            }
            Ok(None) => {
                info!(alias = %spec.alias, "supervisor is stopping; not launching");
                None
            }
            Err(e) => {
                error!(alias = %spec.alias, error = %e, "failed to start process");
                self.ctx.publish(SupervisorEvent::LaunchFailed {
                    alias: spec.alias.clone(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    async fn supervise(self, first: Option<(Arc<ProcessHandle>, Child)>) {
        let Some((mut handle, mut child)) = first else {
            return;
        };

        loop {
            let exit = handle.wait(&mut child).await;
            info!(
                alias = %self.spec.alias,
                pid = ?handle.pid(),
                generation = handle.generation(),
                exit = %exit,
                "process exited"
            );
            self.ctx.publish(SupervisorEvent::ProcessExited {
                alias: self.spec.alias.clone(),
                generation: handle.generation(),
                state: exit,
                at: Instant::now(),
            });

            if self.ctx.registry.is_stopping() || !handle.restart_eligible() {
                break;
            }

            // `wait` reaped the previous child; nothing of it is left running.
            let generation = handle.generation() + 1;
            info!(alias = %self.spec.alias, generation, "restarting");
            self.ctx.publish(SupervisorEvent::Restarting {
                alias: self.spec.alias.clone(),
            });

            match self.launch(generation) {
                Some((next_handle, next_child)) => {
                    handle = next_handle;
                    child = next_child;
                }
                None => break,
            }
        }

        debug!(alias = %self.spec.alias, "runner finished");
    }
}
