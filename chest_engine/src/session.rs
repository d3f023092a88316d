use std::{fs, path::Path, rc::Rc};

use anyhow::{Context, Result};
use chest_formats::SlotPos;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::MenuEngine;
use crate::host::{ActorId, ItemStack};
use crate::menu::{ClickKind, MenuDefinition};
use crate::recording::{HostEvent, RecordingHost};

fn one() -> u32 {
    1
}

/// One scripted thing happening to the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SessionStep {
    Open {
        actor: ActorId,
    },
    Click {
        actor: ActorId,
        slot: SlotPos,
        #[serde(default)]
        kind: ClickKind,
    },
    Submit {
        actor: ActorId,
        directives: Vec<String>,
    },
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
    Advance {
        millis: u64,
    },
    Close {
        actor: ActorId,
    },
    Disconnect {
        actor: ActorId,
    },
    Balance {
        actor: ActorId,
        #[serde(default)]
        currency: String,
        amount: Decimal,
    },
    Hold {
        actor: ActorId,
        item: String,
        quantity: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionScript {
    pub steps: Vec<SessionStep>,
}

impl SessionScript {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading session script {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing session script {}", path.display()))
    }
}

/// State left behind by a replay.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub elapsed_millis: u64,
    pub busy_actors: Vec<ActorId>,
    pub open_menus: Vec<ActorId>,
    pub events: Vec<HostEvent>,
}

/// Run every step of `script` against `engine`, whose collaborators must be
/// the given recording host.
pub fn replay(
    engine: &mut MenuEngine,
    host: &RecordingHost,
    definition: &Rc<MenuDefinition>,
    script: &SessionScript,
) -> SessionReport {
    for step in &script.steps {
        match step {
            SessionStep::Open { actor } => {
                engine.open_menu(actor, definition);
            }
            SessionStep::Click { actor, slot, kind } => {
                if engine.click_slot(actor, *slot, *kind).is_none() {
                    log::debug!("{actor} clicked {slot} without an open menu");
                }
            }
            SessionStep::Submit { actor, directives } => {
                engine.submit_commands(actor, directives);
            }
            SessionStep::Tick { count } => {
                for _ in 0..*count {
                    engine.tick();
                }
            }
            SessionStep::Advance { millis } => engine.advance(*millis),
            SessionStep::Close { actor } => {
                engine.menu_closed(actor);
            }
            SessionStep::Disconnect { actor } => engine.disconnect(actor),
            SessionStep::Balance {
                actor,
                currency,
                amount,
            } => host.set_balance(currency, actor, *amount),
            SessionStep::Hold {
                actor,
                item,
                quantity,
            } => host.hold(actor, Some(ItemStack::new(item.clone(), *quantity))),
        }
    }

    SessionReport {
        elapsed_millis: engine.now(),
        busy_actors: engine.busy_actors(),
        open_menus: engine.open_menus(),
        events: host.events(),
    }
}
