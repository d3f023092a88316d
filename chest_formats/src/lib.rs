pub mod layout;
pub mod slot;

pub use layout::{ItemSpec, MenuLayout};
pub use slot::{MAX_ROWS, MENU_WIDTH, SlotPos, key_to_slot_pos, slot_pos_to_key};

use thiserror::Error;

/// Decode failures for persisted menu layouts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "invalid key representation ({0}): it should start with 'Position-', such as 'Position-1-1'"
    )]
    MissingKeyPrefix(String),
    #[error("invalid key representation ({0}) for slot pos")]
    MalformedKey(String),
    #[error("slot key ({0}) points outside the container")]
    KeyOutOfRange(String),
    #[error("row ({0}) out of bound")]
    RowOutOfBound(u8),
    #[error("column ({0}) out of bound")]
    ColumnOutOfBound(u8),
    #[error("menu must have between 1 and 9 rows (got {0})")]
    InvalidRows(u32),
    #[error("item at {pos} lies below the last of {rows} rows")]
    SlotOutsideMenu { pos: SlotPos, rows: u8 },
}
