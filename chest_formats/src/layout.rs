use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::slot::{MAX_ROWS, SlotPos};
use crate::LayoutError;

/// Per-slot action definition as persisted in a layout document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Directive lines run on a primary (left) click.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_action: Vec<String>,
    /// Directive lines run on a secondary (right) click.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_action: Vec<String>,
    #[serde(default)]
    pub close_on_click: bool,
}

/// A whole menu: title, row count and the items keyed by `Position-x-y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLayout {
    #[serde(alias = "TextTitle")]
    pub title: String,
    #[serde(alias = "Rows")]
    pub rows: u32,
    #[serde(default)]
    pub items: BTreeMap<SlotPos, ItemSpec>,
}

impl MenuLayout {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading menu layout {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parsing menu layout {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let layout: MenuLayout =
            serde_json::from_str(text).context("menu layout is not valid JSON")?;
        layout.validate()?;
        Ok(layout)
    }

    /// Row count as a container height. Only meaningful after `validate`.
    pub fn height(&self) -> u8 {
        self.rows.min(MAX_ROWS as u32) as u8
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.rows == 0 || self.rows > MAX_ROWS as u32 {
            return Err(LayoutError::InvalidRows(self.rows));
        }
        let rows = self.height();
        if let Some(pos) = self.items.keys().find(|pos| pos.row >= rows) {
            return Err(LayoutError::SlotOutsideMenu { pos: *pos, rows });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SHOP: &str = r#"{
        "title": "&aShop",
        "rows": 2,
        "items": {
            "Position-1-1": {
                "name": "Apple",
                "primary_action": ["cost: 5", "tell: &abought an apple"],
                "close_on_click": true
            },
            "Position-9-2": {
                "secondary_action": ["connect: lobby"]
            }
        }
    }"#;

    #[test]
    fn parses_keyed_items() {
        let layout = MenuLayout::from_json_str(SHOP).expect("layout parses");
        assert_eq!(layout.title, "&aShop");
        assert_eq!(layout.height(), 2);

        let apple = &layout.items[&SlotPos::new(0, 0)];
        assert_eq!(apple.name.as_deref(), Some("Apple"));
        assert_eq!(apple.primary_action.len(), 2);
        assert!(apple.close_on_click);

        let portal = &layout.items[&SlotPos::new(8, 1)];
        assert!(portal.primary_action.is_empty());
        assert_eq!(portal.secondary_action, vec!["connect: lobby".to_string()]);
    }

    #[test]
    fn bad_key_fails_the_whole_document() {
        let text = r#"{"title": "x", "rows": 1, "items": {"Slot-1-1": {}}}"#;
        let err = MenuLayout::from_json_str(text).expect_err("key must be rejected");
        assert!(format!("{err:#}").contains("Slot-1-1"));
    }

    #[test]
    fn items_must_fit_inside_the_rows() {
        let text = r#"{"title": "x", "rows": 1, "items": {"Position-1-2": {}}}"#;
        let err = MenuLayout::from_json_str(text).expect_err("row 2 is outside");
        assert_eq!(
            err.downcast_ref::<LayoutError>(),
            Some(&LayoutError::SlotOutsideMenu {
                pos: SlotPos::new(0, 1),
                rows: 1
            })
        );

        let text = r#"{"title": "x", "rows": 0}"#;
        let err = MenuLayout::from_json_str(text).expect_err("zero rows");
        assert_eq!(
            err.downcast_ref::<LayoutError>(),
            Some(&LayoutError::InvalidRows(0))
        );
    }

    #[test]
    fn serialises_back_to_position_keys() {
        let layout = MenuLayout::from_json_str(SHOP).expect("layout parses");
        let json = serde_json::to_value(&layout).expect("serialise");
        assert!(json["items"].get("Position-1-1").is_some());
        assert!(json["items"].get("Position-9-2").is_some());
    }

    #[test]
    fn loads_from_disk_with_legacy_field_names() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"TextTitle": "Legacy", "Rows": 3}}"#).expect("write layout");
        let layout = MenuLayout::from_json_file(file.path()).expect("layout loads");
        assert_eq!(layout.title, "Legacy");
        assert_eq!(layout.height(), 3);
        assert!(layout.items.is_empty());
    }
}
