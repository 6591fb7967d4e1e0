// src/engine/shutdown.rs

//! The one-shot shutdown cascade.
//!
//! 1. Flip the registry's stopping flag (no launches or restarts after this).
//! 2. Clear restart eligibility on every tracked process and send a graceful
//!    termination request to each one still alive.
//! 3. Wait the grace period, or less if every process is already gone.
//! 4. Forcefully kill whatever is still alive.
//! 5. Wait for the group to drain like any other participant.
//!
//! Only the first caller runs the cascade; later requests are no-ops.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine::SupervisorEvent;
use crate::engine::supervisor::SupervisorContext;
use crate::exec::process::ProcessHandle;
use crate::types::TerminationKind;

/// Cloneable handle that starts the shutdown cascade.
///
/// OS termination requests go through the same path, so triggering by hand
/// and receiving SIGINT/SIGTERM are indistinguishable to the group.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    ctx: Arc<SupervisorContext>,
}

impl ShutdownTrigger {
    pub(crate) fn new(ctx: Arc<SupervisorContext>) -> Self {
        Self { ctx }
    }

    /// Whether a cascade has already been started.
    pub fn is_triggered(&self) -> bool {
        self.ctx.cascade_started.load(Ordering::SeqCst)
    }

    /// Run the cascade to completion.
    ///
    /// Returns `true` if this call ran it and `false` if another caller got
    /// there first (in which case this returns immediately).
    pub async fn trigger(&self, reason: impl Into<String>) -> bool {
        if self.ctx.cascade_started.swap(true, Ordering::SeqCst) {
            debug!("shutdown already in progress; ignoring request");
            return false;
        }
        run_cascade(&self.ctx, reason.into()).await;
        true
    }
}

async fn run_cascade(ctx: &SupervisorContext, reason: String) {
    let token = ctx.completion.token();

    let tracked = ctx.registry.begin_stopping();
    let live = tracked.iter().filter(|h| !h.is_terminal()).count();
    info!(%reason, processes = live, "caught termination request");
    ctx.publish(SupervisorEvent::ShutdownStarted {
        reason,
        at: Instant::now(),
    });

    for handle in tracked.iter() {
        handle.disable_restart();
    }
    send_to_live(ctx, &tracked, TerminationKind::Graceful);

    info!(grace_period = ?ctx.grace_period, "waiting before SIGKILL");
    tokio::select! {
        _ = tokio::time::sleep(ctx.grace_period) => {}
        _ = all_terminated(&tracked) => {
            debug!("every process exited within the grace period");
        }
    }

    send_to_live(ctx, &tracked, TerminationKind::Forceful);

    info!("shutdown cascade done");
    ctx.publish(SupervisorEvent::ShutdownFinished);

    drop(token);
    ctx.completion.wait().await;
}

fn send_to_live(ctx: &SupervisorContext, handles: &[Arc<ProcessHandle>], kind: TerminationKind) {
    for handle in handles.iter().filter(|h| !h.is_terminal()) {
        info!(alias = %handle.alias(), pid = ?handle.pid(), signal = %kind, "send {kind}");
        match handle.terminate(kind) {
            Ok(()) => ctx.publish(SupervisorEvent::SignalSent {
                alias: handle.alias().to_string(),
                kind,
                at: Instant::now(),
            }),
            Err(e) => warn!(alias = %handle.alias(), error = %e, "termination request not delivered"),
        }
    }
}

async fn all_terminated(handles: &[Arc<ProcessHandle>]) {
    for handle in handles {
        handle.terminated().await;
    }
}
