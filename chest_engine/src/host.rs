//! Narrow contracts for everything the menu pipeline does not own: text
//! templating, the economy ledger, command execution, chat/title delivery,
//! the raw proxy channel, the cursor-held item and closing a presented menu.

use std::fmt;
use std::rc::Rc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable identifier of a connected user session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result handed to a continuation once a directive finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Success,
    Failure,
}

impl ActionOutcome {
    pub fn from_bool(success: bool) -> Self {
        if success {
            ActionOutcome::Success
        } else {
            ActionOutcome::Failure
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ActionOutcome::Success)
    }
}

/// Identity a command runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "actor", rename_all = "snake_case")]
pub enum CommandSource {
    Actor(ActorId),
    Console,
}

/// Text as written in a directive, tagged with how the renderer should read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "text", rename_all = "snake_case")]
pub enum MessageText {
    /// `&`-style formatting codes.
    Formatted(String),
    /// Structured (JSON) chat component.
    Json(String),
}

/// One merged title packet. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<MessageText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<MessageText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

pub trait PlaceholderResolver {
    fn resolve(&self, actor: &ActorId, text: &str) -> String;
}

/// Currency `""` is the ledger's default currency.
pub trait Economy {
    fn withdraw(&self, currency: &str, actor: &ActorId, amount: Decimal, offline: bool) -> bool;
    fn deposit(&self, currency: &str, actor: &ActorId, amount: Decimal, offline: bool) -> bool;
}

pub trait CommandRunner {
    fn run(&self, source: &CommandSource, command: &str) -> ActionOutcome;
}

pub trait Messenger {
    fn send_message(&self, actor: &ActorId, text: &MessageText);
    fn broadcast(&self, text: &MessageText);
    fn send_action_bar(&self, actor: &ActorId, text: &MessageText);
    fn send_title(&self, actor: &ActorId, title: &TitleUpdate);
}

/// Raw plugin-message channel towards the actor's connection.
pub trait RawChannel {
    fn send_to(&self, actor: &ActorId, channel: &str, payload: &[u8]);
}

/// Item currently held on the actor's cursor.
pub trait HeldItems {
    fn held_item(&self, actor: &ActorId) -> Option<ItemStack>;
    fn set_held_item(&self, actor: &ActorId, stack: Option<ItemStack>);
}

pub trait MenuPresenter {
    fn close_menu(&self, actor: &ActorId);
}

macro_rules! opaque_debug {
    ($($name:ident),* $(,)?) => {
        $(
            impl fmt::Debug for dyn $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(stringify!($name))
                }
            }
        )*
    };
}

opaque_debug!(
    PlaceholderResolver,
    Economy,
    CommandRunner,
    Messenger,
    RawChannel,
    HeldItems,
    MenuPresenter,
);

/// Bundle of collaborators handed to directive handlers.
#[derive(Debug, Clone)]
pub struct Host {
    pub placeholders: Rc<dyn PlaceholderResolver>,
    pub economy: Rc<dyn Economy>,
    pub commands: Rc<dyn CommandRunner>,
    pub messenger: Rc<dyn Messenger>,
    pub channel: Rc<dyn RawChannel>,
    pub held_items: Rc<dyn HeldItems>,
    pub presenter: Rc<dyn MenuPresenter>,
}

impl Host {
    /// Use one object for every collaborator role.
    pub fn shared<T>(inner: Rc<T>) -> Self
    where
        T: PlaceholderResolver
            + Economy
            + CommandRunner
            + Messenger
            + RawChannel
            + HeldItems
            + MenuPresenter
            + 'static,
    {
        Self {
            placeholders: inner.clone(),
            economy: inner.clone(),
            commands: inner.clone(),
            messenger: inner.clone(),
            channel: inner.clone(),
            held_items: inner.clone(),
            presenter: inner,
        }
    }
}
