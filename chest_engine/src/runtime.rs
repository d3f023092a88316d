use std::{fs, path::Path, rc::Rc};

use anyhow::{Context, Result};
use chest_engine::{
    host::Host,
    menu::MenuDefinition,
    recording::{HostEvent, RecordingHost},
    session::{self, SessionReport, SessionScript},
    EngineConfig, MenuEngine,
};
use chest_formats::MenuLayout;

use crate::cli::{Command, InspectArgs, ReplayArgs};

pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Replay(args) => run_replay(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn load_definition(path: &Path) -> Result<Rc<MenuDefinition>> {
    let layout = MenuLayout::from_json_file(path)?;
    let definition = MenuDefinition::from_layout(&layout)
        .with_context(|| format!("building menu from {}", path.display()))?;
    Ok(Rc::new(definition))
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let ReplayArgs {
        layout,
        session,
        config,
        event_log_json,
        verbose,
    } = args;

    let config = EngineConfig::from_json_file(config.as_deref())?;
    let definition = load_definition(&layout)?;
    let script = SessionScript::from_json_file(&session)?;
    if let Some(path) = event_log_json.as_ref() {
        log::info!("capturing host events to {}", path.display());
    }

    let recorder = Rc::new(RecordingHost::new());
    let mut engine = MenuEngine::new(config, Host::shared(recorder.clone()));
    let report = session::replay(&mut engine, &recorder, &definition, &script);

    if let Some(path) = event_log_json.as_ref() {
        persist_report(path, &report)?;
    }

    println!(
        "Replayed {} steps against {:?} ({} ms elapsed)",
        script.steps.len(),
        definition.title(),
        report.elapsed_millis
    );
    println!("Host events recorded: {}", report.events.len());
    if !report.busy_actors.is_empty() {
        println!("Chains still pending:");
        for actor in &report.busy_actors {
            println!(
                "  - {actor} ({} directives left)",
                engine.remaining_directives(actor).unwrap_or(0)
            );
        }
    }
    if !report.open_menus.is_empty() {
        let names: Vec<&str> = report.open_menus.iter().map(|a| a.as_str()).collect();
        println!("Menus still open: {}", names.join(", "));
    }
    if verbose {
        println!("\nEvents:");
        for (idx, event) in report.events.iter().enumerate() {
            println!("  {:>3}. {}", idx + 1, describe_event(event));
        }
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = EngineConfig::from_json_file(args.config.as_deref())?;
    let layout = MenuLayout::from_json_file(&args.layout)?;
    let definition = MenuDefinition::from_layout(&layout)
        .with_context(|| format!("building menu from {}", args.layout.display()))?;
    let engine = MenuEngine::new(config, Host::shared(Rc::new(RecordingHost::new())));

    println!(
        "Menu {:?}: {} rows, {} bound items",
        definition.title(),
        definition.height(),
        layout.items.len()
    );
    for (pos, spec) in &layout.items {
        let label = spec.name.as_deref().unwrap_or("<unnamed>");
        let close = if spec.close_on_click { " [closes]" } else { "" };
        println!("  {pos} {label}{close}");
        for line in &spec.primary_action {
            println!("      primary:   {}", describe_line(&engine, line));
        }
        for line in &spec.secondary_action {
            println!("      secondary: {}", describe_line(&engine, line));
        }
    }
    println!(
        "\nRegistered prefixes: {}",
        engine
            .registry()
            .prefixes()
            .filter(|prefix| !prefix.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn describe_line(engine: &MenuEngine, line: &str) -> String {
    match engine.registry().resolve(line) {
        Some(("", command)) => format!("{command:?} (command)"),
        Some((prefix, payload)) => format!("{prefix} <- {payload:?}"),
        None => "(empty)".to_string(),
    }
}

fn persist_report(path: &Path, report: &SessionReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json =
        serde_json::to_string_pretty(report).context("serializing session report to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing session report to {}", path.display()))?;
    println!("Saved session report to {}", path.display());
    Ok(())
}

fn describe_event(event: &HostEvent) -> String {
    match event {
        HostEvent::Message { actor, text } => format!("message -> {actor}: {text:?}"),
        HostEvent::Broadcast { text } => format!("broadcast: {text:?}"),
        HostEvent::ActionBar { actor, text } => format!("action bar -> {actor}: {text:?}"),
        HostEvent::Title { actor, update } => format!(
            "title -> {actor}: {:?} / {:?}",
            update.title, update.subtitle
        ),
        HostEvent::Command {
            source,
            command,
            outcome,
        } => format!("command {command:?} as {source:?} => {outcome:?}"),
        HostEvent::Withdraw {
            actor,
            currency,
            amount,
            success,
        } => format!("withdraw {amount} {currency:?} from {actor} (ok: {success})"),
        HostEvent::Deposit {
            actor,
            currency,
            amount,
            success,
        } => format!("deposit {amount} {currency:?} to {actor} (ok: {success})"),
        HostEvent::ChannelMessage {
            actor,
            channel,
            payload,
            request,
        } => match request {
            Some(request) => format!("{channel} <- {actor}: {request:?}"),
            None => format!("{channel} <- {actor}: {} bytes", payload.len()),
        },
        HostEvent::HeldItem { actor, stack } => format!("held item of {actor}: {stack:?}"),
        HostEvent::MenuClosed { actor } => format!("menu closed for {actor}"),
    }
}
