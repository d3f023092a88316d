use std::str::FromStr;

use chest_channel::ProxyRequest;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::registry::DirectiveRegistry;
use super::{ActionContext, Continuation};
use crate::host::{ActionOutcome, CommandSource, ItemStack, MessageText};

pub(super) fn install(registry: &mut DirectiveRegistry) {
    registry.register_prefix("console", run_console);
    registry.register_prefix("tell", tell);
    registry.register_prefix("tellraw", tellraw);
    registry.register_prefix("broadcast", broadcast);
    registry.register_prefix("title", action_bar);
    registry.register_prefix("bigtitle", bigtitle);
    registry.register_prefix("subtitle", subtitle);
    registry.register_prefix("delay", delay);
    registry.register_prefix("connect", connect);
    registry.register_prefix("cost", cost);
    registry.register_prefix("cost-item", cost_item);

    registry.register_prefix("", run_command);
}

fn formatted(payload: &str) -> MessageText {
    MessageText::Formatted(payload.trim_end().to_string())
}

/// Parse a strictly positive integer, tolerating surrounding whitespace.
fn parse_positive(payload: &str) -> Option<u64> {
    payload.trim().parse::<u64>().ok().filter(|value| *value > 0)
}

/// Split `[currency:]amount`; the currency is everything before the last `:`.
fn parse_cost(payload: &str) -> Option<(String, Decimal)> {
    let (currency, amount) = match payload.rfind(':') {
        Some(index) => (payload[..index].to_lowercase(), &payload[index + 1..]),
        None => (String::new(), payload),
    };
    let amount = amount.trim();
    let value = Decimal::from_str(amount)
        .or_else(|_| Decimal::from_scientific(amount))
        .ok()?;
    Some((currency, value))
}

fn run_command(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let source = CommandSource::Actor(cx.actor().clone());
    let outcome = cx.host().commands.run(&source, payload.trim_end());
    cx.complete(next, outcome);
}

fn run_console(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let outcome = cx
        .host()
        .commands
        .run(&CommandSource::Console, payload.trim_end());
    cx.complete(next, outcome);
}

fn tell(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    cx.host().messenger.send_message(cx.actor(), &formatted(payload));
    cx.complete(next, ActionOutcome::Success);
}

fn tellraw(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let text = MessageText::Json(payload.trim_end().to_string());
    cx.host().messenger.send_message(cx.actor(), &text);
    cx.complete(next, ActionOutcome::Success);
}

fn broadcast(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    cx.host().messenger.broadcast(&formatted(payload));
    cx.complete(next, ActionOutcome::Success);
}

fn action_bar(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    cx.host()
        .messenger
        .send_action_bar(cx.actor(), &formatted(payload));
    cx.complete(next, ActionOutcome::Success);
}

fn bigtitle(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let actor = cx.actor();
    cx.titles().push_title(actor, formatted(payload));
    cx.complete(next, ActionOutcome::Success);
}

fn subtitle(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let actor = cx.actor();
    cx.titles().push_subtitle(actor, formatted(payload));
    cx.complete(next, ActionOutcome::Success);
}

fn delay(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    match parse_positive(payload) {
        Some(ticks) => {
            let millis = cx.config().delay_millis(ticks);
            cx.complete_after(next, ActionOutcome::Success, millis);
        }
        None => {
            debug!("{}: delay needs a positive tick count, got {payload:?}", cx.actor());
            cx.complete(next, ActionOutcome::Failure);
        }
    }
}

fn connect(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let request = ProxyRequest::connect(payload.trim_end());
    let outcome = match request.encode() {
        Ok(bytes) => {
            cx.host()
                .channel
                .send_to(cx.actor(), &cx.config().proxy_channel, &bytes);
            ActionOutcome::Success
        }
        Err(err) => {
            warn!("{}: cannot encode connect request: {err}", cx.actor());
            ActionOutcome::Failure
        }
    };
    cx.complete(next, outcome);
}

fn cost(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let Some((currency, amount)) = parse_cost(payload) else {
        debug!("{}: unreadable cost {payload:?}", cx.actor());
        cx.complete(next, ActionOutcome::Failure);
        return;
    };
    let economy = &cx.host().economy;
    let success = if amount > Decimal::ZERO {
        economy.withdraw(&currency, cx.actor(), amount, false)
    } else {
        economy.deposit(&currency, cx.actor(), -amount, false)
    };
    cx.complete(next, ActionOutcome::from_bool(success));
}

fn cost_item(cx: &mut ActionContext<'_>, payload: &str, next: Continuation) {
    let Some(count) = parse_positive(payload) else {
        debug!("{}: cost-item needs a positive count, got {payload:?}", cx.actor());
        cx.complete(next, ActionOutcome::Failure);
        return;
    };
    let held_items = &cx.host().held_items;
    let held = held_items.held_item(cx.actor());
    let quantity = held.as_ref().map_or(0, |stack| u64::from(stack.quantity));
    let outcome = match held {
        Some(stack) if quantity > count => {
            let remaining = ItemStack::new(stack.item, (quantity - count) as u32);
            held_items.set_held_item(cx.actor(), Some(remaining));
            ActionOutcome::Success
        }
        _ => {
            held_items.set_held_item(cx.actor(), None);
            ActionOutcome::Failure
        }
    };
    cx.complete(next, outcome);
}
