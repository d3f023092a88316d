use std::cmp::Ordering;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::LayoutError;

/// Fixed width of every menu container.
pub const MENU_WIDTH: u8 = 9;

/// Largest number of rows any container can carry.
pub const MAX_ROWS: u8 = 9;

const KEY_PREFIX: &str = "Position-";

/// Zero-based `(column, row)` position inside a menu.
///
/// Positions order row-major (row first, then column), matching the order
/// live slots are walked when a menu is built or opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPos {
    pub column: u8,
    pub row: u8,
}

impl SlotPos {
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }

    /// Position of the `index`th slot in row-major order.
    pub const fn from_ordinal(index: usize) -> Self {
        Self {
            column: (index % MENU_WIDTH as usize) as u8,
            row: (index / MENU_WIDTH as usize) as u8,
        }
    }

    pub const fn ordinal(self) -> usize {
        self.row as usize * MENU_WIDTH as usize + self.column as usize
    }
}

impl Ord for SlotPos {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.column).cmp(&(other.row, other.column))
    }
}

impl PartialOrd for SlotPos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SlotPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Encode a position as its persisted key.
///
/// `SlotPos::new(2, 3)` becomes `"Position-3-4"`.
pub fn slot_pos_to_key(pos: SlotPos) -> Result<String, LayoutError> {
    if pos.row >= MAX_ROWS {
        return Err(LayoutError::RowOutOfBound(pos.row));
    }
    if pos.column >= MENU_WIDTH {
        return Err(LayoutError::ColumnOutOfBound(pos.column));
    }
    Ok(format!("{KEY_PREFIX}{}-{}", pos.column + 1, pos.row + 1))
}

/// Decode a persisted key such as `"Position-3-4"` into `SlotPos::new(2, 3)`.
pub fn key_to_slot_pos(key: &str) -> Result<SlotPos, LayoutError> {
    let rest = key
        .strip_prefix(KEY_PREFIX)
        .ok_or_else(|| LayoutError::MissingKeyPrefix(key.to_string()))?;
    let (column, row) = rest
        .split_once('-')
        .ok_or_else(|| LayoutError::MalformedKey(key.to_string()))?;
    // the row component is always a single digit
    if row.len() != 1 {
        return Err(LayoutError::MalformedKey(key.to_string()));
    }
    let column = parse_component(key, column)?;
    let row = parse_component(key, row)?;
    if !(1..=MAX_ROWS as u32).contains(&row) || !(1..=MENU_WIDTH as u32).contains(&column) {
        return Err(LayoutError::KeyOutOfRange(key.to_string()));
    }
    Ok(SlotPos::new((column - 1) as u8, (row - 1) as u8))
}

fn parse_component(key: &str, digits: &str) -> Result<u32, LayoutError> {
    // leading zeros would decode to a key that encodes differently
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return Err(LayoutError::MalformedKey(key.to_string()));
    }
    digits
        .parse::<u32>()
        .map_err(|_| LayoutError::MalformedKey(key.to_string()))
}

impl Serialize for SlotPos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = slot_pos_to_key(*self).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&key)
    }
}

impl<'de> Deserialize<'de> for SlotPos {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = SlotPos;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a slot key such as \"Position-1-1\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<SlotPos, E> {
                key_to_slot_pos(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_for_every_cell() {
        for row in 0..MAX_ROWS {
            for column in 0..MENU_WIDTH {
                let pos = SlotPos::new(column, row);
                let key = slot_pos_to_key(pos).expect("encodable");
                assert_eq!(key_to_slot_pos(&key), Ok(pos), "key {key}");
            }
        }
    }

    #[test]
    fn key_format_is_one_based() {
        assert_eq!(
            slot_pos_to_key(SlotPos::new(2, 3)).as_deref(),
            Ok("Position-3-4")
        );
        assert_eq!(key_to_slot_pos("Position-1-1"), Ok(SlotPos::new(0, 0)));
    }

    #[test]
    fn row_nine_cannot_be_encoded() {
        assert_eq!(
            slot_pos_to_key(SlotPos::new(0, 9)),
            Err(LayoutError::RowOutOfBound(9))
        );
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert_eq!(
            key_to_slot_pos("BadKey"),
            Err(LayoutError::MissingKeyPrefix("BadKey".to_string()))
        );
        for key in [
            "Position-",
            "Position-1",
            "Position-1-",
            "Position--1",
            "Position-1-12",
            "Position-a-1",
            "Position-+1-1",
            "Position-1-1-1",
            "Position-01-1",
            "Position-001-3",
        ] {
            assert!(key_to_slot_pos(key).is_err(), "{key} should not decode");
        }
        assert_eq!(
            key_to_slot_pos("Position-1-0"),
            Err(LayoutError::KeyOutOfRange("Position-1-0".to_string()))
        );
        assert_eq!(
            key_to_slot_pos("Position-01-1"),
            Err(LayoutError::MalformedKey("Position-01-1".to_string()))
        );
        assert_eq!(
            key_to_slot_pos("Position-10-1"),
            Err(LayoutError::KeyOutOfRange("Position-10-1".to_string()))
        );
    }

    #[test]
    fn ordering_is_row_major() {
        let mut positions = vec![
            SlotPos::new(0, 1),
            SlotPos::new(8, 0),
            SlotPos::new(3, 1),
            SlotPos::new(0, 0),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                SlotPos::new(0, 0),
                SlotPos::new(8, 0),
                SlotPos::new(0, 1),
                SlotPos::new(3, 1),
            ]
        );
        assert_eq!(SlotPos::from_ordinal(10), SlotPos::new(1, 1));
        assert_eq!(SlotPos::new(1, 1).ordinal(), 10);
    }
}
