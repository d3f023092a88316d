//! Menu definitions and the per-open router feeding clicks into the
//! directive pipeline.

use std::collections::BTreeMap;
use std::rc::Rc;

use chest_formats::{LayoutError, MenuLayout, SlotPos, MAX_ROWS, MENU_WIDTH};

mod item;
mod live;

pub use item::{BoundItem, ClickKind, ItemAction, ItemResponse, ScriptedItem};
pub use live::{
    ClickEvent, ClickOutcome, LiveMenu, LiveSlot, MenuId, MenuState, SlotAllocator,
    SlotTransaction,
};

use crate::host::ActorId;

/// Immutable menu shared by every open: title, height and bound items.
#[derive(Debug)]
pub struct MenuDefinition {
    title: String,
    height: u8,
    items: BTreeMap<SlotPos, Rc<dyn BoundItem>>,
}

impl MenuDefinition {
    pub fn new(
        title: impl Into<String>,
        height: u8,
        items: BTreeMap<SlotPos, Rc<dyn BoundItem>>,
    ) -> Result<Self, LayoutError> {
        if height == 0 || height > MAX_ROWS {
            return Err(LayoutError::InvalidRows(height as u32));
        }
        if let Some(pos) = items
            .keys()
            .find(|pos| pos.row >= height || pos.column >= MENU_WIDTH)
        {
            return Err(LayoutError::SlotOutsideMenu {
                pos: *pos,
                rows: height,
            });
        }
        Ok(Self {
            title: title.into(),
            height,
            items,
        })
    }

    /// Build a definition whose items are `ScriptedItem`s from the layout.
    pub fn from_layout(layout: &MenuLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        let items = layout
            .items
            .iter()
            .map(|(pos, spec)| (*pos, Rc::new(ScriptedItem::from(spec)) as Rc<dyn BoundItem>))
            .collect();
        Self::new(layout.title.clone(), layout.height(), items)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn item(&self, pos: SlotPos) -> Option<&Rc<dyn BoundItem>> {
        self.items.get(&pos)
    }

    pub fn items(&self) -> impl Iterator<Item = (&SlotPos, &Rc<dyn BoundItem>)> {
        self.items.iter()
    }

    /// Build a fresh `MENU_WIDTH` x `height` container for the actor. Slot
    /// bindings are captured later, when the container reports it opened.
    pub fn create_instance(self: &Rc<Self>, actor: &ActorId, slots: &mut SlotAllocator) -> LiveMenu {
        let id = slots.next_menu_id();
        let slots = slots.allocate(MENU_WIDTH as usize * self.height as usize);
        LiveMenu::new(id, actor.clone(), Rc::clone(self), slots)
    }
}
