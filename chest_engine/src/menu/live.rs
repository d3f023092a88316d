use std::collections::BTreeMap;
use std::rc::Rc;

use chest_formats::{SlotPos, MENU_WIDTH};
use log::debug;

use super::item::{BoundItem, ClickKind, ItemAction};
use super::MenuDefinition;
use crate::host::ActorId;

/// Identity of one slot of one live container. Never reused, so the same
/// cell of the same definition gets a new identity on every open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LiveSlot(u64);

impl LiveSlot {
    pub fn ordinal(self) -> u64 {
        self.0
    }
}

/// Identity of one live container. A deferred close only applies to the
/// container it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuId(u64);

/// Hands out fresh slot and container identities for new containers.
#[derive(Debug, Default)]
pub struct SlotAllocator {
    next: u64,
    next_menu: u64,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, count: usize) -> Vec<LiveSlot> {
        (0..count)
            .map(|_| {
                let slot = LiveSlot(self.next);
                self.next = self.next.wrapping_add(1);
                slot
            })
            .collect()
    }

    pub fn next_menu_id(&mut self) -> MenuId {
        let id = MenuId(self.next_menu);
        self.next_menu = self.next_menu.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTransaction {
    pub slot: LiveSlot,
}

/// A click delivered by the host. Handling always cancels the default
/// slot transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    kind: ClickKind,
    transactions: Vec<SlotTransaction>,
    cancelled: bool,
}

impl ClickEvent {
    pub fn new(kind: ClickKind, transactions: Vec<SlotTransaction>) -> Self {
        Self {
            kind,
            transactions,
            cancelled: false,
        }
    }

    pub fn on_slot(kind: ClickKind, slot: LiveSlot) -> Self {
        Self::new(kind, vec![SlotTransaction { slot }])
    }

    pub fn kind(&self) -> ClickKind {
        self.kind
    }

    pub fn transactions(&self) -> &[SlotTransaction] {
        &self.transactions
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Created,
    Open,
    Closed,
}

/// What the router gathered from the bound items touched by one click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub directives: Vec<String>,
    pub close_requested: bool,
}

/// One actor's open copy of a menu definition, plus the router that binds
/// its live slots to the definition's items.
#[derive(Debug)]
pub struct LiveMenu {
    id: MenuId,
    actor: ActorId,
    definition: Rc<MenuDefinition>,
    slots: Vec<LiveSlot>,
    state: MenuState,
    bindings: BTreeMap<LiveSlot, Rc<dyn BoundItem>>,
}

impl LiveMenu {
    pub(super) fn new(
        id: MenuId,
        actor: ActorId,
        definition: Rc<MenuDefinition>,
        slots: Vec<LiveSlot>,
    ) -> Self {
        Self {
            id,
            actor,
            definition,
            slots,
            state: MenuState::Created,
            bindings: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> MenuId {
        self.id
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn title(&self) -> &str {
        self.definition.title()
    }

    pub fn height(&self) -> u8 {
        self.definition.height()
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Live slots in row-major order.
    pub fn slots(&self) -> &[LiveSlot] {
        &self.slots
    }

    pub fn slot_at(&self, pos: SlotPos) -> Option<LiveSlot> {
        if pos.column >= MENU_WIDTH {
            return None;
        }
        self.slots.get(pos.ordinal()).copied()
    }

    pub fn is_bound(&self, slot: LiveSlot) -> bool {
        self.bindings.contains_key(&slot)
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    /// Capture the live slot to item binding. Runs on every open because
    /// slot identities differ between opens of the same definition.
    pub fn on_open(&mut self) {
        if self.state == MenuState::Closed {
            return;
        }
        self.bindings.clear();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(item) = self.definition.item(SlotPos::from_ordinal(index)) {
                self.bindings.insert(*slot, item.clone());
            }
        }
        self.state = MenuState::Open;
        debug!(
            "{} opened {:?} with {} bound slots",
            self.actor,
            self.title(),
            self.bindings.len()
        );
    }

    /// Cancel the click, fire every bound item it touched and report the
    /// collected directives and whether any item asked to close.
    pub fn on_click(&mut self, click: &mut ClickEvent) -> ClickOutcome {
        click.set_cancelled(true);
        let mut outcome = ClickOutcome::default();
        if self.state != MenuState::Open {
            return outcome;
        }
        for transaction in click.transactions() {
            if let Some(item) = self.bindings.get(&transaction.slot) {
                let response = item.fire(&self.actor, click);
                outcome.directives.extend(response.directives);
                if response.action == ItemAction::CloseMenu {
                    outcome.close_requested = true;
                }
            }
        }
        outcome
    }

    pub fn on_close(&mut self) {
        self.state = MenuState::Closed;
        self.bindings.clear();
    }
}
