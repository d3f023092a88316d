use std::fs;
use std::process::Command;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tempfile::tempdir;

const LAYOUT: &str = r#"{
    "TextTitle": "Warp Menu",
    "Rows": 1,
    "items": {
        "Position-1-1": {
            "name": "Lobby",
            "primary_action": ["tell: sending %player% to the lobby", "delay: 2", "connect: lobby"],
            "close_on_click": true
        },
        "Position-5-1": {
            "name": "Donate",
            "primary_action": ["cost: 5", "bigtitle: Thanks!", "subtitle: %player%"]
        }
    }
}"#;

const SESSION: &str = r#"{"steps": [
    {"step": "balance", "actor": "alex", "amount": 8},
    {"step": "open", "actor": "alex"},
    {"step": "click", "actor": "alex", "slot": "Position-5-1"},
    {"step": "tick"},
    {"step": "click", "actor": "alex", "slot": "Position-1-1"},
    {"step": "tick", "count": 3}
]}"#;

#[derive(Debug, Deserialize)]
struct SessionReport {
    elapsed_millis: u64,
    busy_actors: Vec<String>,
    open_menus: Vec<String>,
    events: Vec<Value>,
}

#[test]
fn replay_writes_the_event_log() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary directory for session artefacts")?;
    let layout_path = temp_dir.path().join("warp.json");
    let session_path = temp_dir.path().join("session.json");
    let report_path = temp_dir.path().join("reports").join("events.json");
    fs::write(&layout_path, LAYOUT).context("writing layout fixture")?;
    fs::write(&session_path, SESSION).context("writing session fixture")?;

    let output = Command::new(env!("CARGO_BIN_EXE_chest_engine"))
        .arg("--layout")
        .arg(&layout_path)
        .arg("--session")
        .arg(&session_path)
        .arg("--event-log-json")
        .arg(&report_path)
        .arg("--verbose")
        .output()
        .context("executing chest_engine session replay")?;

    let mut transcript = String::from_utf8_lossy(&output.stdout).to_string();
    transcript.push_str(&String::from_utf8_lossy(&output.stderr));
    assert!(
        output.status.success(),
        "chest_engine exited with {:?}: {transcript}",
        output.status
    );
    assert!(
        transcript.contains("Replayed 6 steps"),
        "replay summary missing from output: {transcript}"
    );

    let raw = fs::read_to_string(&report_path)
        .with_context(|| format!("reading {}", report_path.display()))?;
    let report: SessionReport = serde_json::from_str(&raw).context("parsing session report")?;

    assert_eq!(report.elapsed_millis, 200);
    assert!(report.busy_actors.is_empty());
    assert!(report.open_menus.is_empty());

    let kinds: Vec<&str> = report
        .events
        .iter()
        .filter_map(|event| event.get("kind").and_then(Value::as_str))
        .collect();
    assert_eq!(
        kinds,
        vec!["withdraw", "title", "message", "menu_closed", "channel_message"]
    );

    let title = &report.events[1]["update"];
    assert_eq!(title["title"]["text"], "Thanks!");
    assert_eq!(title["subtitle"]["text"], "alex");

    let connect = &report.events[4];
    assert_eq!(connect["channel"], "BungeeCord");
    assert_eq!(connect["request"]["server"], "lobby");
    Ok(())
}

#[test]
fn inspect_lists_resolved_directives() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary directory for layout fixture")?;
    let layout_path = temp_dir.path().join("warp.json");
    fs::write(&layout_path, LAYOUT).context("writing layout fixture")?;

    let output = Command::new(env!("CARGO_BIN_EXE_chest_engine"))
        .arg("--layout")
        .arg(&layout_path)
        .output()
        .context("executing chest_engine layout inspection")?;
    let transcript = String::from_utf8_lossy(&output.stdout).to_string();

    assert!(output.status.success(), "inspection failed: {transcript}");
    assert!(transcript.contains("Menu \"Warp Menu\": 1 rows, 2 bound items"));
    assert!(transcript.contains("connect <- \"lobby\""));
    Ok(())
}

#[test]
fn broken_layouts_are_reported() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary directory for layout fixture")?;
    let layout_path = temp_dir.path().join("broken.json");
    fs::write(
        &layout_path,
        r#"{"title": "Broken", "rows": 1, "items": {"Position-1-2": {}}}"#,
    )
    .context("writing layout fixture")?;

    let output = Command::new(env!("CARGO_BIN_EXE_chest_engine"))
        .arg("--layout")
        .arg(&layout_path)
        .output()
        .context("executing chest_engine layout inspection")?;

    assert!(!output.status.success());
    Ok(())
}
