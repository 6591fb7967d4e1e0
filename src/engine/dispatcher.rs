// src/engine/dispatcher.rs

//! Expanding a composite alias into member launches.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{AliasDefinition, AliasSet, CompositeAlias, SimpleAlias, validate_members};
use crate::engine::SupervisorContext;
use crate::errors::{AliasError, Result};
use crate::exec::runner::AliasRunner;
use crate::types::AttachMode;

/// How a member is launched relative to the rest of the dispatch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Run inline; later members wait until this one is finished.
    Blocking,
    /// Start and move on; waiting happens in a background task.
    Concurrent,
}

impl Dispatch {
    /// Attached members block the sequence, except those with a restart
    /// policy, which run concurrently and keep interactive input.
    pub fn for_member(alias: &SimpleAlias) -> Self {
        match (alias.mode, alias.restart) {
            (AttachMode::Attached, false) => Dispatch::Blocking,
            (AttachMode::Attached, true) => Dispatch::Concurrent,
            (AttachMode::Detached, _) => Dispatch::Concurrent,
        }
    }

    /// A lone alias has no later members to starve.
    pub fn for_single(alias: &SimpleAlias) -> Self {
        match alias.mode {
            AttachMode::Attached => Dispatch::Blocking,
            AttachMode::Detached => Dispatch::Concurrent,
        }
    }
}

#[derive(Debug)]
pub struct CompositeDispatcher<'a> {
    aliases: &'a AliasSet,
    ctx: Arc<SupervisorContext>,
}

impl<'a> CompositeDispatcher<'a> {
    pub fn new(aliases: &'a AliasSet, ctx: Arc<SupervisorContext>) -> Self {
        Self { aliases, ctx }
    }

    /// Resolve every member of `composite` before anything is launched.
    pub fn resolve(&self, composite: &CompositeAlias) -> Result<Vec<&'a SimpleAlias>> {
        validate_members(composite, |name| self.aliases.contains(name))?;

        composite
            .members
            .iter()
            .map(|name| match self.aliases.get(name) {
                Some(AliasDefinition::Simple(simple)) => Ok(simple),
                Some(AliasDefinition::Composite(_)) => Err(AliasError::ConfigError(format!(
                    "alias '{}' lists composite alias '{}' as a member",
                    composite.name, name
                ))),
                None => Err(AliasError::UndefinedMember {
                    alias: composite.name.clone(),
                    missing: vec![name.clone()],
                }),
            })
            .collect()
    }

    /// Launch every member in listed order.
    ///
    /// Returns once every blocking member has finished; concurrent members
    /// are still running at that point and tracked by the supervisor.
    pub async fn dispatch(&self, composite: &CompositeAlias) -> Result<()> {
        let members = self.resolve(composite)?;
        info!(alias = %composite.name, members = ?composite.members, "dispatching composite alias");

        for member in members {
            if self.ctx.registry.is_stopping() {
                info!(alias = %member.name, "supervisor is stopping; skipping remaining members");
                break;
            }

            let dispatch = Dispatch::for_member(member);
            if member.mode.is_attached() && dispatch == Dispatch::Concurrent {
                warn!(alias = %member.name, "attached alias restarts; running it concurrently");
            }
            launch(member, dispatch, Arc::clone(&self.ctx)).await;
        }

        Ok(())
    }
}

/// Prepare and launch one simple alias.
///
/// Preparation failures are logged and recorded as a terminal launch; they
/// never abort sibling members.
pub(crate) async fn launch(alias: &SimpleAlias, dispatch: Dispatch, ctx: Arc<SupervisorContext>) {
    let runner = match AliasRunner::prepare(alias, Arc::clone(&ctx)) {
        Ok(runner) => runner,
        Err(e) => {
            error!(alias = %alias.name, error = %e, "cannot launch alias");
            ctx.registry.record_failure(&alias.name);
            ctx.publish(crate::engine::SupervisorEvent::LaunchFailed {
                alias: alias.name.clone(),
                error: e.to_string(),
            });
            return;
        }
    };

    match dispatch {
        Dispatch::Blocking => runner.run_attached().await,
        Dispatch::Concurrent => {
            runner.start_detached();
        }
    }
}
