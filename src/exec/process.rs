// src/exec/process.rs

//! One launched OS process and its observable lifecycle.
//!
//! A [`ProcessHandle`] is shared between the runner that owns the
//! [`Child`] (and therefore waits on it) and the shutdown cascade, which only
//! ever signals it. The child itself never leaves the runner; forceful kills
//! are requested through the handle and carried out by the waiting side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::process::Child;
use tokio::sync::{Notify, watch};
use tracing::{debug, warn};

use crate::errors::{AliasError, Result};
use crate::exec::command::LaunchSpec;
use crate::types::{ExitState, TerminationKind};

/// Lifecycle of a single launch.
///
/// `Starting → Running → Exited`, or `LaunchFailed` when the OS refused to
/// start it. Restarts create a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Running,
    Exited(ExitState),
    LaunchFailed,
}

impl ProcessState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Exited(_) | ProcessState::LaunchFailed)
    }
}

#[derive(Debug)]
pub struct ProcessHandle {
    alias: String,
    generation: u32,
    pid: OnceLock<u32>,
    state: watch::Sender<ProcessState>,
    restart_eligible: AtomicBool,
    kill_requested: Notify,
}

impl ProcessHandle {
    /// A handle in the `Starting` state, ready to be registered before the
    /// process exists.
    pub fn starting(alias: &str, generation: u32, restart: bool) -> Arc<Self> {
        let (state, _) = watch::channel(ProcessState::Starting);
        Arc::new(Self {
            alias: alias.to_string(),
            generation,
            pid: OnceLock::new(),
            state,
            restart_eligible: AtomicBool::new(restart),
            kill_requested: Notify::new(),
        })
    }

    /// Spawn the process described by `spec` and move to `Running`.
    ///
    /// On failure the handle becomes `LaunchFailed` and loses its restart
    /// eligibility.
    pub fn spawn(&self, spec: &LaunchSpec) -> Result<Child> {
        debug!(alias = %self.alias, generation = self.generation, "spawning process");

        match spec.to_command().spawn() {
            Ok(child) => {
                if let Some(pid) = child.id() {
                    let _ = self.pid.set(pid);
                }
                self.state.send_replace(ProcessState::Running);
                Ok(child)
            }
            Err(source) => {
                self.disable_restart();
                self.state.send_replace(ProcessState::LaunchFailed);
                Err(AliasError::LaunchFailure {
                    alias: spec.alias.clone(),
                    source,
                })
            }
        }
    }

    /// A terminal handle standing in for an alias that never started.
    pub fn launch_failed(alias: &str) -> Arc<Self> {
        let handle = Self::starting(alias, 0, false);
        handle.state.send_replace(ProcessState::LaunchFailed);
        handle
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// 0 for the first launch, incremented on every restart.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid.get().copied()
    }

    pub fn state(&self) -> ProcessState {
        *self.state.borrow()
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn exit_state(&self) -> Option<ExitState> {
        match self.state() {
            ProcessState::Exited(s) => Some(s),
            _ => None,
        }
    }

    pub fn restart_eligible(&self) -> bool {
        self.restart_eligible.load(Ordering::SeqCst)
    }

    /// Permanently clear restart eligibility for this launch.
    pub fn disable_restart(&self) {
        self.restart_eligible.store(false, Ordering::SeqCst);
    }

    /// Resolve once this launch reaches a terminal state.
    pub async fn terminated(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|s| s.is_terminal()).await;
    }

    /// Wait for `child` to exit, honouring forceful kill requests meanwhile.
    ///
    /// Must be called by the owner of the child belonging to this handle.
    pub async fn wait(&self, child: &mut Child) -> ExitState {
        let mut killed = false;
        let exit = loop {
            tokio::select! {
                status = child.wait() => {
                    break match status {
                        Ok(status) => ExitState::from_status(status),
                        Err(e) => {
                            warn!(alias = %self.alias, pid = ?self.pid(), error = %e, "waiting for process failed");
                            ExitState::Failed(-1)
                        }
                    };
                }
                _ = self.kill_requested.notified(), if !killed => {
                    killed = true;
                    if let Err(e) = child.start_kill() {
                        warn!(alias = %self.alias, pid = ?self.pid(), error = %e, "failed to kill process");
                    }
                }
            }
        };

        self.state.send_replace(ProcessState::Exited(exit));
        exit
    }

    /// Deliver a termination request to the underlying process.
    ///
    /// Fails with [`AliasError::SignalDelivery`] when the process is already
    /// gone or the OS refuses the signal.
    pub fn terminate(&self, kind: TerminationKind) -> Result<()> {
        if self.is_terminal() {
            return Err(self.delivery_error(kind, "process already exited"));
        }

        match kind {
            TerminationKind::Forceful => {
                self.kill_requested.notify_one();
                Ok(())
            }
            TerminationKind::Graceful => self.send_graceful(),
        }
    }

    #[cfg(unix)]
    fn send_graceful(&self) -> Result<()> {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let pid = self
            .pid()
            .ok_or_else(|| self.delivery_error(TerminationKind::Graceful, "no pid"))?;

        kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
            .map_err(|e| self.delivery_error(TerminationKind::Graceful, &e.to_string()))
    }

    /// No graceful request exists off Unix; escalate straight away.
    #[cfg(not(unix))]
    fn send_graceful(&self) -> Result<()> {
        self.kill_requested.notify_one();
        Ok(())
    }

    fn delivery_error(&self, kind: TerminationKind, reason: &str) -> AliasError {
        AliasError::SignalDelivery {
            alias: self.alias.clone(),
            signal: kind.to_string(),
            reason: reason.to_string(),
        }
    }
}
