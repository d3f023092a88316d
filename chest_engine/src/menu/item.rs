use std::fmt;

use chest_formats::ItemSpec;
use serde::{Deserialize, Serialize};

use crate::host::ActorId;

use super::live::ClickEvent;

/// Which mouse action produced a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickKind {
    #[default]
    Primary,
    Secondary,
}

/// What the menu should do after an item handled a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemAction {
    #[default]
    Keep,
    CloseMenu,
}

/// Directive lines produced by one bound item for one click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemResponse {
    pub directives: Vec<String>,
    pub action: ItemAction,
}

/// Per-slot action payload bound into a menu definition.
pub trait BoundItem {
    fn fire(&self, actor: &ActorId, click: &ClickEvent) -> ItemResponse;
}

impl fmt::Debug for dyn BoundItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoundItem")
    }
}

/// Bound item driven by a layout entry: fixed directive lists per click kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedItem {
    pub name: Option<String>,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub close_on_click: bool,
}

impl From<&ItemSpec> for ScriptedItem {
    fn from(spec: &ItemSpec) -> Self {
        Self {
            name: spec.name.clone(),
            primary: spec.primary_action.clone(),
            secondary: spec.secondary_action.clone(),
            close_on_click: spec.close_on_click,
        }
    }
}

impl BoundItem for ScriptedItem {
    fn fire(&self, _actor: &ActorId, click: &ClickEvent) -> ItemResponse {
        let directives = match click.kind() {
            ClickKind::Primary => self.primary.clone(),
            ClickKind::Secondary => self.secondary.clone(),
        };
        ItemResponse {
            directives,
            action: if self.close_on_click {
                ItemAction::CloseMenu
            } else {
                ItemAction::Keep
            },
        }
    }
}
