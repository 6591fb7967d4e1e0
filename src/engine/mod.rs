// src/engine/mod.rs

//! Supervision engine.
//!
//! This module ties together:
//! - the process registry (which launches are tracked and whether the group
//!   is stopping)
//! - the completion barrier the supervisor blocks on
//! - composite dispatch (attached members inline, detached ones concurrently)
//! - the one-shot shutdown cascade and the OS termination-request listener
//!
//! The [`Supervisor`] owns all of it; runners and the cascade share its
//! state through an `Arc<SupervisorContext>`.

use std::time::Instant;

use crate::types::{ExitState, TerminationKind};

/// Canonical alias name type used throughout the engine.
pub type AliasName = String;

/// Progress events published by the supervisor.
///
/// Delivered over a `tokio::sync::broadcast` channel; see
/// [`Supervisor::subscribe`].
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// A process for `alias` was spawned and registered.
    ProcessStarted {
        alias: AliasName,
        pid: Option<u32>,
        generation: u32,
        at: Instant,
    },
    /// A process for `alias` exited.
    ProcessExited {
        alias: AliasName,
        generation: u32,
        state: ExitState,
        at: Instant,
    },
    /// `alias` is about to be relaunched by its restart policy.
    Restarting { alias: AliasName },
    /// `alias` could not be started at all.
    LaunchFailed { alias: AliasName, error: String },
    /// The shutdown cascade began.
    ShutdownStarted { reason: String, at: Instant },
    /// A termination request was delivered to `alias`.
    SignalSent {
        alias: AliasName,
        kind: TerminationKind,
        at: Instant,
    },
    /// The cascade finished signalling (the group may still be draining).
    ShutdownFinished,
}

pub mod completion;
pub mod dispatcher;
pub mod registry;
pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use completion::{CompletionBarrier, CompletionToken};
pub use dispatcher::{CompositeDispatcher, Dispatch};
pub use registry::Registry;
pub use shutdown::ShutdownTrigger;
pub use signals::{TerminationListener, TerminationRequest};
pub use supervisor::{Supervisor, SupervisorContext, SupervisorOptions};
