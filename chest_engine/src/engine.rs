use std::collections::BTreeMap;
use std::rc::Rc;

use chest_formats::SlotPos;
use log::{debug, trace};

use crate::actions::{ChainRunner, DirectiveRegistry, StepEnv, TitleBatcher};
use crate::config::EngineConfig;
use crate::host::{ActorId, Host};
use crate::menu::{ClickEvent, ClickKind, ClickOutcome, LiveMenu, MenuDefinition, SlotAllocator};
use crate::scheduler::{PeriodicTask, ScheduledTask, TickScheduler};

/// Single-threaded host-side state: directive chains, title batching, the
/// tick clock and every actor's open menu.
#[derive(Debug)]
pub struct MenuEngine {
    config: EngineConfig,
    host: Host,
    scheduler: TickScheduler,
    chains: ChainRunner,
    titles: TitleBatcher,
    menus: BTreeMap<ActorId, LiveMenu>,
    slots: SlotAllocator,
}

impl MenuEngine {
    pub fn new(config: EngineConfig, host: Host) -> Self {
        Self::with_registry(config, host, DirectiveRegistry::with_builtins())
    }

    pub fn with_registry(config: EngineConfig, host: Host, registry: DirectiveRegistry) -> Self {
        let mut engine = Self {
            config,
            host,
            scheduler: TickScheduler::new(),
            chains: ChainRunner::new(registry),
            titles: TitleBatcher::new(),
            menus: BTreeMap::new(),
            slots: SlotAllocator::new(),
        };
        if engine.config.title_flush_enabled {
            engine.enable_title_flush();
        }
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        self.chains.registry()
    }

    pub fn registry_mut(&mut self) -> &mut DirectiveRegistry {
        self.chains.registry_mut()
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// (Re)install the title flush task on the tick clock.
    pub fn enable_title_flush(&mut self) {
        self.titles
            .enable(&mut self.scheduler, self.config.tick_millis);
    }

    pub fn disable_title_flush(&mut self) {
        self.titles.disable(&mut self.scheduler);
    }

    pub fn is_busy(&self, actor: &ActorId) -> bool {
        self.chains.is_busy(actor)
    }

    pub fn remaining_directives(&self, actor: &ActorId) -> Option<usize> {
        self.chains.remaining(actor)
    }

    pub fn busy_actors(&self) -> Vec<ActorId> {
        self.chains.active_actors()
    }

    /// Replace the actor's directive chain with `lines` and run it until it
    /// finishes or suspends.
    pub fn submit_commands<S: AsRef<str>>(&mut self, actor: &ActorId, lines: &[S]) {
        self.chains.submit(&self.host, actor, lines);
        self.drive();
    }

    pub fn open_menu(&mut self, actor: &ActorId, definition: &Rc<MenuDefinition>) -> &LiveMenu {
        if let Some(mut previous) = self.menus.remove(actor) {
            previous.on_close();
        }
        let mut menu = definition.create_instance(actor, &mut self.slots);
        menu.on_open();
        self.menus.entry(actor.clone()).or_insert(menu)
    }

    pub fn menu(&self, actor: &ActorId) -> Option<&LiveMenu> {
        self.menus.get(actor)
    }

    pub fn open_menus(&self) -> Vec<ActorId> {
        self.menus.keys().cloned().collect()
    }

    /// Route a click through the actor's open menu. Directives are only
    /// submitted while the actor is idle; a close request takes effect one
    /// tick later, and only if that same menu is still open then.
    pub fn click(&mut self, actor: &ActorId, click: &mut ClickEvent) -> Option<ClickOutcome> {
        let menu = self.menus.get_mut(actor)?;
        let menu_id = menu.id();
        let outcome = menu.on_click(click);
        if !outcome.directives.is_empty() {
            if self.chains.is_busy(actor) {
                debug!("{actor} clicked while busy; ignoring {:?}", outcome.directives);
            } else {
                self.submit_commands(actor, &outcome.directives);
            }
        }
        if outcome.close_requested {
            self.scheduler.schedule(
                self.config.tick_millis,
                ScheduledTask::CloseMenu {
                    actor: actor.clone(),
                    menu: menu_id,
                },
            );
        }
        Some(outcome)
    }

    /// Click the slot at `pos` of the actor's open menu.
    pub fn click_slot(
        &mut self,
        actor: &ActorId,
        pos: SlotPos,
        kind: ClickKind,
    ) -> Option<ClickOutcome> {
        let slot = self.menus.get(actor)?.slot_at(pos)?;
        self.click(actor, &mut ClickEvent::on_slot(kind, slot))
    }

    /// Close the actor's menu through the presenter.
    pub fn close_menu(&mut self, actor: &ActorId) -> bool {
        if self.menu_closed(actor) {
            self.host.presenter.close_menu(actor);
            true
        } else {
            false
        }
    }

    /// The host reports the actor closed the menu on their own.
    pub fn menu_closed(&mut self, actor: &ActorId) -> bool {
        match self.menus.remove(actor) {
            Some(mut menu) => {
                menu.on_close();
                true
            }
            None => false,
        }
    }

    /// Drop everything held for the actor. Pending timers for the actor
    /// become no-ops when they fire.
    pub fn disconnect(&mut self, actor: &ActorId) {
        self.chains.forget(actor);
        self.titles.forget(actor);
        if let Some(mut menu) = self.menus.remove(actor) {
            menu.on_close();
        }
        debug!("{actor} disconnected");
    }

    /// Advance the clock by one tick.
    pub fn tick(&mut self) {
        self.advance(self.config.tick_millis);
    }

    /// Advance the clock, running every task that falls due on the way.
    pub fn advance(&mut self, millis: u64) {
        let target = self.scheduler.now().saturating_add(millis);
        while let Some(task) = self.scheduler.pop_due(target) {
            self.run_task(task);
        }
        self.scheduler.set_now(target);
    }

    fn run_task(&mut self, task: ScheduledTask) {
        match task {
            ScheduledTask::Resume {
                continuation,
                outcome,
            } => {
                self.chains.resume(continuation, outcome);
                self.drive();
            }
            ScheduledTask::CloseMenu { actor, menu } => {
                if self.menus.get(&actor).map(LiveMenu::id) == Some(menu) {
                    self.close_menu(&actor);
                } else {
                    trace!("{actor}: deferred close for a menu that is gone");
                }
            }
            ScheduledTask::Periodic(PeriodicTask::FlushTitles) => {
                self.titles.flush(self.host.messenger.as_ref());
            }
        }
    }

    fn drive(&mut self) {
        let mut env = StepEnv {
            host: &self.host,
            config: &self.config,
            titles: &mut self.titles,
            scheduler: &mut self.scheduler,
        };
        self.chains.drive(&mut env);
    }
}
