//! Directive execution pipeline: prefix registry, line resolver, the
//! per-actor chain runner, the built-in handlers and title batching.

use std::collections::VecDeque;

mod chain;
mod handlers;
mod registry;
mod titles;

pub use chain::{ChainRunner, Continuation};
pub(crate) use chain::StepEnv;
pub use registry::{Directive, DirectiveHandler, DirectiveRegistry, PREFIX_SPLITTER};
pub use titles::TitleBatcher;

use crate::config::EngineConfig;
use crate::host::{ActionOutcome, ActorId, Host};
use crate::scheduler::{ScheduledTask, TickScheduler};

/// Everything a directive handler may touch while it runs for one actor.
pub struct ActionContext<'a> {
    actor: &'a ActorId,
    host: &'a Host,
    config: &'a EngineConfig,
    titles: &'a mut TitleBatcher,
    scheduler: &'a mut TickScheduler,
    ready: &'a mut VecDeque<(Continuation, ActionOutcome)>,
}

impl<'a> ActionContext<'a> {
    pub fn actor(&self) -> &'a ActorId {
        self.actor
    }

    pub fn host(&self) -> &'a Host {
        self.host
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    pub fn titles(&mut self) -> &mut TitleBatcher {
        &mut *self.titles
    }

    /// Hand control back to the chain now.
    pub fn complete(&mut self, next: Continuation, outcome: ActionOutcome) {
        self.ready.push_back((next, outcome));
    }

    /// Hand control back once `delay_millis` have passed on the tick clock.
    pub fn complete_after(&mut self, next: Continuation, outcome: ActionOutcome, delay_millis: u64) {
        self.scheduler.schedule(
            delay_millis,
            ScheduledTask::Resume {
                continuation: next,
                outcome,
            },
        );
    }
}
