// src/engine/supervisor.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{AliasDefinition, AliasSet, DEFAULT_GRACE_PERIOD};
use crate::engine::completion::CompletionBarrier;
use crate::engine::dispatcher::{self, CompositeDispatcher, Dispatch};
use crate::engine::registry::Registry;
use crate::engine::shutdown::ShutdownTrigger;
use crate::engine::signals::TerminationListener;
use crate::engine::SupervisorEvent;
use crate::errors::{AliasError, Result};

/// Knobs for one supervised run.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorOptions {
    /// Wait between the graceful and the forceful termination request.
    pub grace_period: Duration,
    /// Install SIGINT/SIGTERM (Ctrl-C) handling for the run.
    pub listen_for_signals: bool,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            listen_for_signals: true,
        }
    }
}

/// State shared between the supervisor, its runners and the cascade.
pub struct SupervisorContext {
    pub(crate) registry: Registry,
    pub(crate) completion: CompletionBarrier,
    pub(crate) cascade_started: AtomicBool,
    pub(crate) grace_period: Duration,
    events: broadcast::Sender<SupervisorEvent>,
}

impl fmt::Debug for SupervisorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisorContext")
            .field("registry", &self.registry)
            .field("completion", &self.completion)
            .field("grace_period", &self.grace_period)
            .finish_non_exhaustive()
    }
}

impl SupervisorContext {
    fn new(grace_period: Duration) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            registry: Registry::new(),
            completion: CompletionBarrier::new(),
            cascade_started: AtomicBool::new(false),
            grace_period,
            events,
        }
    }

    /// Publish an event; having no subscribers is fine.
    pub(crate) fn publish(&self, event: SupervisorEvent) {
        let _ = self.events.send(event);
    }
}

/// Owns one group's lifecycle end to end.
///
/// ```no_run
/// # async fn demo(aliases: aliases::config::AliasSet) -> aliases::errors::Result<()> {
/// use aliases::engine::{Supervisor, SupervisorOptions};
///
/// let supervisor = Supervisor::new(aliases, SupervisorOptions::default());
/// let code = supervisor.run("dev").await?;
/// std::process::exit(code);
/// # }
/// ```
#[derive(Debug)]
pub struct Supervisor {
    aliases: AliasSet,
    options: SupervisorOptions,
    ctx: Arc<SupervisorContext>,
}

impl Supervisor {
    pub fn new(aliases: AliasSet, options: SupervisorOptions) -> Self {
        let ctx = Arc::new(SupervisorContext::new(options.grace_period));
        Self {
            aliases,
            options,
            ctx,
        }
    }

    /// Subscribe to progress events. Subscribe before [`Supervisor::run`]
    /// to see every event of the run.
    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.ctx.events.subscribe()
    }

    /// Handle that runs the same one-shot cascade as an OS termination
    /// request.
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        ShutdownTrigger::new(Arc::clone(&self.ctx))
    }

    pub fn registry(&self) -> &Registry {
        &self.ctx.registry
    }

    pub fn is_stopping(&self) -> bool {
        self.ctx.registry.is_stopping()
    }

    /// Run `selected` and block until every tracked process is finished.
    ///
    /// Composite membership is validated before anything starts; an
    /// undefined member fails the whole run with `UndefinedMember`.
    /// Per-alias failures are logged and do not affect the exit code.
    pub async fn run(&self, selected: &str) -> Result<i32> {
        let definition = self
            .aliases
            .get(selected)
            .ok_or_else(|| AliasError::AliasNotFound(selected.to_string()))?;

        let dispatcher = CompositeDispatcher::new(&self.aliases, Arc::clone(&self.ctx));
        if let AliasDefinition::Composite(composite) = definition {
            dispatcher.resolve(composite)?;
        }

        let listener = self.spawn_signal_listener();

        match definition {
            AliasDefinition::Simple(simple) => {
                dispatcher::launch(simple, Dispatch::for_single(simple), Arc::clone(&self.ctx))
                    .await;
            }
            AliasDefinition::Composite(composite) => {
                dispatcher.dispatch(composite).await?;
            }
        }

        debug!(outstanding = self.ctx.completion.outstanding(), "waiting for group completion");
        self.ctx.completion.wait().await;

        if let Some(listener) = listener {
            listener.abort();
        }

        info!(alias = %selected, "all processes finished");
        Ok(0)
    }

    fn spawn_signal_listener(&self) -> Option<JoinHandle<()>> {
        if !self.options.listen_for_signals {
            return None;
        }

        let mut listener = match TerminationListener::install() {
            Ok(listener) => listener,
            Err(e) => {
                warn!(error = %e, "failed to listen for termination requests");
                return None;
            }
        };
        let trigger = self.shutdown_trigger();

        Some(tokio::spawn(async move {
            while let Some(request) = listener.recv().await {
                if trigger.is_triggered() {
                    info!(%request, "shutdown already in progress");
                    continue;
                }
                let trigger = trigger.clone();
                tokio::spawn(async move {
                    trigger.trigger(request.to_string()).await;
                });
            }
        }))
    }
}
