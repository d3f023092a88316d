use std::env;

use anyhow::{Context, Result};
use chest_formats::MenuLayout;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .context("usage: layout_dump <layout JSON>")?;
    let layout = MenuLayout::from_json_file(&path)?;
    println!(
        "{} ({} rows, {} bound slots) from {}",
        layout.title,
        layout.rows,
        layout.items.len(),
        path
    );
    for (pos, item) in &layout.items {
        let key = chest_formats::slot_pos_to_key(*pos)?;
        println!(
            "{key:<14} {name:<24} primary {primary:>2} secondary {secondary:>2}{close}",
            name = item.name.as_deref().unwrap_or("-"),
            primary = item.primary_action.len(),
            secondary = item.secondary_action.len(),
            close = if item.close_on_click { " closes" } else { "" }
        );
    }
    Ok(())
}
