use std::collections::{HashMap, VecDeque};

use log::{debug, trace, warn};

use super::registry::{Directive, DirectiveRegistry};
use super::titles::TitleBatcher;
use super::ActionContext;
use crate::config::EngineConfig;
use crate::host::{ActionOutcome, ActorId, Host};
use crate::scheduler::TickScheduler;

/// Handle a directive handler completes to hand control back to the chain.
///
/// It names the actor and the chain generation it was issued for. Completing
/// it consumes it; a continuation for a chain that has since been replaced or
/// dropped is ignored.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a directive chain stalls until its continuation is completed"]
pub struct Continuation {
    actor: ActorId,
    generation: u64,
}

impl Continuation {
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }
}

#[derive(Debug)]
struct ChainBinding {
    generation: u64,
    directives: VecDeque<Directive>,
}

/// Borrowed engine state a chain step needs besides the runner itself.
pub(crate) struct StepEnv<'a> {
    pub(crate) host: &'a Host,
    pub(crate) config: &'a EngineConfig,
    pub(crate) titles: &'a mut TitleBatcher,
    pub(crate) scheduler: &'a mut TickScheduler,
}

/// Runs each actor's directives strictly in order, one at a time.
///
/// Completions are queued and drained iteratively, so a long chain of
/// synchronous directives never grows the call stack.
#[derive(Debug)]
pub struct ChainRunner {
    registry: DirectiveRegistry,
    bindings: HashMap<ActorId, ChainBinding>,
    ready: VecDeque<(Continuation, ActionOutcome)>,
    next_generation: u64,
}

impl ChainRunner {
    pub fn new(registry: DirectiveRegistry) -> Self {
        Self {
            registry,
            bindings: HashMap::new(),
            ready: VecDeque::new(),
            next_generation: 1,
        }
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DirectiveRegistry {
        &mut self.registry
    }

    /// True while the actor has a chain that has not run to completion.
    pub fn is_busy(&self, actor: &ActorId) -> bool {
        self.bindings.contains_key(actor)
    }

    /// Directives still waiting to start for the actor.
    pub fn remaining(&self, actor: &ActorId) -> Option<usize> {
        self.bindings
            .get(actor)
            .map(|binding| binding.directives.len())
    }

    pub fn active_actors(&self) -> Vec<ActorId> {
        let mut actors: Vec<ActorId> = self.bindings.keys().cloned().collect();
        actors.sort();
        actors
    }

    /// Resolve `lines` and install them as the actor's chain, replacing any
    /// chain already bound to the actor. The first step is queued with a
    /// success seed; call `drive` to run it.
    pub(crate) fn submit<S: AsRef<str>>(&mut self, host: &Host, actor: &ActorId, lines: &[S]) {
        let raw: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        debug!("{actor} tries to run {raw:?}");

        let mut directives = VecDeque::with_capacity(raw.len());
        for line in raw {
            if let Some((prefix, payload)) = self.registry.resolve(line) {
                let payload = host.placeholders.resolve(actor, payload);
                directives.push_back(Directive::new(prefix, payload));
            }
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        if let Some(previous) = self.bindings.insert(
            actor.clone(),
            ChainBinding {
                generation,
                directives,
            },
        ) {
            debug!(
                "{actor} replaced a chain with {} directives left",
                previous.directives.len()
            );
        }
        self.ready.push_back((
            Continuation {
                actor: actor.clone(),
                generation,
            },
            ActionOutcome::Success,
        ));
    }

    /// Queue a continuation completed outside a handler call, e.g. by a timer.
    pub(crate) fn resume(&mut self, continuation: Continuation, outcome: ActionOutcome) {
        self.ready.push_back((continuation, outcome));
    }

    /// Drop the actor's chain; outstanding continuations become no-ops.
    pub(crate) fn forget(&mut self, actor: &ActorId) -> bool {
        self.bindings.remove(actor).is_some()
    }

    /// Run queued steps until every chain is either finished or suspended.
    pub(crate) fn drive(&mut self, env: &mut StepEnv<'_>) {
        while let Some((continuation, outcome)) = self.ready.pop_front() {
            self.step(env, continuation, outcome);
        }
    }

    fn step(&mut self, env: &mut StepEnv<'_>, continuation: Continuation, outcome: ActionOutcome) {
        let actor = continuation.actor.clone();
        let directive = match self.bindings.get_mut(&actor) {
            Some(binding) if binding.generation == continuation.generation => {
                binding.directives.pop_front()
            }
            _ => {
                trace!("{actor}: stale continuation ({outcome:?}) ignored");
                return;
            }
        };

        let Some(directive) = directive else {
            self.bindings.remove(&actor);
            debug!(
                "{actor} finished its directives (last succeeded: {})",
                outcome.is_success()
            );
            return;
        };

        debug!("{actor} is now executing {directive}");
        match self.registry.handler(&directive.prefix) {
            Some(handler) => {
                let mut cx = ActionContext {
                    actor: &actor,
                    host: env.host,
                    config: env.config,
                    titles: &mut *env.titles,
                    scheduler: &mut *env.scheduler,
                    ready: &mut self.ready,
                };
                handler(&mut cx, &directive.payload, continuation);
            }
            None => {
                warn!("{actor}: no handler for prefix {:?}", directive.prefix);
                self.ready.push_back((continuation, ActionOutcome::Failure));
            }
        }
    }
}
