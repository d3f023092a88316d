use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
};

use chest_channel::ProxyRequest;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::host::{
    ActionOutcome, ActorId, CommandRunner, CommandSource, Economy, HeldItems, ItemStack,
    MenuPresenter, MessageText, Messenger, PlaceholderResolver, RawChannel, TitleUpdate,
};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([a-z_]+)%").expect("placeholder pattern is valid"));

/// Everything the recording host observed, in call order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    Message {
        actor: ActorId,
        text: MessageText,
    },
    Broadcast {
        text: MessageText,
    },
    ActionBar {
        actor: ActorId,
        text: MessageText,
    },
    Title {
        actor: ActorId,
        update: TitleUpdate,
    },
    Command {
        source: CommandSource,
        command: String,
        outcome: ActionOutcome,
    },
    Withdraw {
        actor: ActorId,
        currency: String,
        amount: Decimal,
        success: bool,
    },
    Deposit {
        actor: ActorId,
        currency: String,
        amount: Decimal,
        success: bool,
    },
    ChannelMessage {
        actor: ActorId,
        channel: String,
        payload: Vec<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        request: Option<ProxyRequest>,
    },
    HeldItem {
        actor: ActorId,
        stack: Option<ItemStack>,
    },
    MenuClosed {
        actor: ActorId,
    },
}

/// In-memory host used by the session replay binary and by tests.
///
/// Balances start at zero; withdrawals fail when they would go negative.
/// Commands succeed unless registered with `fail_command`.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: RefCell<Vec<HostEvent>>,
    balances: RefCell<BTreeMap<(String, ActorId), Decimal>>,
    held: RefCell<BTreeMap<ActorId, ItemStack>>,
    failing_commands: RefCell<BTreeSet<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn take_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn balance(&self, currency: &str, actor: &ActorId) -> Decimal {
        self.balances
            .borrow()
            .get(&(currency.to_string(), actor.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn set_balance(&self, currency: &str, actor: &ActorId, amount: Decimal) {
        self.balances
            .borrow_mut()
            .insert((currency.to_string(), actor.clone()), amount);
    }

    /// Put a stack on the actor's cursor without recording an event.
    pub fn hold(&self, actor: &ActorId, stack: Option<ItemStack>) {
        let mut held = self.held.borrow_mut();
        match stack {
            Some(stack) if stack.quantity > 0 => {
                held.insert(actor.clone(), stack);
            }
            _ => {
                held.remove(actor);
            }
        }
    }

    pub fn fail_command(&self, command: impl Into<String>) {
        self.failing_commands.borrow_mut().insert(command.into());
    }

    fn record(&self, event: HostEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl PlaceholderResolver for RecordingHost {
    fn resolve(&self, actor: &ActorId, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures<'_>| match &caps[1] {
                "player" => actor.to_string(),
                "balance" => self.balance("", actor).to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl Economy for RecordingHost {
    fn withdraw(&self, currency: &str, actor: &ActorId, amount: Decimal, _offline: bool) -> bool {
        let current = self.balance(currency, actor);
        let success = current >= amount;
        if success {
            self.set_balance(currency, actor, current - amount);
        }
        self.record(HostEvent::Withdraw {
            actor: actor.clone(),
            currency: currency.to_string(),
            amount,
            success,
        });
        success
    }

    fn deposit(&self, currency: &str, actor: &ActorId, amount: Decimal, _offline: bool) -> bool {
        let current = self.balance(currency, actor);
        self.set_balance(currency, actor, current + amount);
        self.record(HostEvent::Deposit {
            actor: actor.clone(),
            currency: currency.to_string(),
            amount,
            success: true,
        });
        true
    }
}

impl CommandRunner for RecordingHost {
    fn run(&self, source: &CommandSource, command: &str) -> ActionOutcome {
        let outcome = ActionOutcome::from_bool(!self.failing_commands.borrow().contains(command));
        self.record(HostEvent::Command {
            source: source.clone(),
            command: command.to_string(),
            outcome,
        });
        outcome
    }
}

impl Messenger for RecordingHost {
    fn send_message(&self, actor: &ActorId, text: &MessageText) {
        self.record(HostEvent::Message {
            actor: actor.clone(),
            text: text.clone(),
        });
    }

    fn broadcast(&self, text: &MessageText) {
        self.record(HostEvent::Broadcast { text: text.clone() });
    }

    fn send_action_bar(&self, actor: &ActorId, text: &MessageText) {
        self.record(HostEvent::ActionBar {
            actor: actor.clone(),
            text: text.clone(),
        });
    }

    fn send_title(&self, actor: &ActorId, title: &TitleUpdate) {
        self.record(HostEvent::Title {
            actor: actor.clone(),
            update: title.clone(),
        });
    }
}

impl RawChannel for RecordingHost {
    fn send_to(&self, actor: &ActorId, channel: &str, payload: &[u8]) {
        self.record(HostEvent::ChannelMessage {
            actor: actor.clone(),
            channel: channel.to_string(),
            payload: payload.to_vec(),
            request: ProxyRequest::decode(payload).ok(),
        });
    }
}

impl HeldItems for RecordingHost {
    fn held_item(&self, actor: &ActorId) -> Option<ItemStack> {
        self.held.borrow().get(actor).cloned()
    }

    fn set_held_item(&self, actor: &ActorId, stack: Option<ItemStack>) {
        self.hold(actor, stack.clone());
        self.record(HostEvent::HeldItem {
            actor: actor.clone(),
            stack,
        });
    }
}

impl MenuPresenter for RecordingHost {
    fn close_menu(&self, actor: &ActorId) {
        self.record(HostEvent::MenuClosed {
            actor: actor.clone(),
        });
    }
}
