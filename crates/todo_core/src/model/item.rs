//! Item domain model.
//!
//! # Responsibility
//! - Define the task record persisted in the `items` table.
//! - Validate record shape at construction, decode and encode time.
//!
//! # Invariants
//! - `id` is `None` until the store flushes the item; afterwards it is the
//!   storage rowid and never reassigned.
//! - `text` is non-empty after trimming.
//! - There is no operation that resets `done` to `false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identity of a persisted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for item records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Text is empty or whitespace only.
    EmptyText,
    /// Storage ids are positive rowids.
    InvalidId(i64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "item text must not be empty"),
            Self::InvalidId(id) => write!(f, "item id must be positive, got {id}"),
        }
    }
}

impl Error for ItemValidationError {}

/// A single task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemWire")]
pub struct Item {
    /// Rowid assigned on flush; `None` for items not yet persisted.
    pub id: Option<ItemId>,
    /// Optional due time. `None` means "whenever".
    pub due: Option<DateTime<Utc>>,
    /// Display text, never empty.
    pub text: String,
    pub done: bool,
}

#[derive(Deserialize)]
struct ItemWire {
    id: Option<ItemId>,
    due: Option<DateTime<Utc>>,
    text: String,
    #[serde(default)]
    done: bool,
}

impl TryFrom<ItemWire> for Item {
    type Error = ItemValidationError;

    fn try_from(wire: ItemWire) -> Result<Self, Self::Error> {
        let item = Self {
            id: wire.id,
            due: wire.due,
            text: wire.text,
            done: wire.done,
        };
        item.validate()?;
        Ok(item)
    }
}

impl Item {
    /// Creates an unpersisted, not-done item.
    ///
    /// Surrounding whitespace is trimmed from `text`.
    pub fn new(
        due: Option<DateTime<Utc>>,
        text: impl Into<String>,
    ) -> Result<Self, ItemValidationError> {
        let item = Self {
            id: None,
            due,
            text: text.into().trim().to_string(),
            done: false,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.text.trim().is_empty() {
            return Err(ItemValidationError::EmptyText);
        }
        if let Some(ItemId(raw)) = self.id {
            if raw <= 0 {
                return Err(ItemValidationError::InvalidId(raw));
            }
        }
        Ok(())
    }

    /// Returns a copy marked as done. Idempotent for items already done.
    pub fn completed(&self) -> Self {
        Self {
            done: true,
            ..self.clone()
        }
    }

    /// Returns whether the item is due strictly before `now` and still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.due.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemId, ItemValidationError};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn new_trims_text_and_defaults_to_open() {
        let item = Item::new(None, "  buy milk \n").unwrap();
        assert_eq!(item.text, "buy milk");
        assert_eq!(item.id, None);
        assert!(!item.done);
    }

    #[test]
    fn new_rejects_blank_text() {
        assert_eq!(
            Item::new(None, " \t ").unwrap_err(),
            ItemValidationError::EmptyText
        );
    }

    #[test]
    fn completed_is_idempotent() {
        let mut item = Item::new(None, "water plants").unwrap();
        item.id = Some(ItemId(4));
        let once = item.completed();
        let twice = once.completed();
        assert!(once.done);
        assert_eq!(once, twice);
        assert!(!item.done);
    }

    #[test]
    fn overdue_requires_open_item_with_past_due() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let past = Item::new(Some(now - Duration::minutes(1)), "late").unwrap();
        assert!(past.is_overdue(now));
        assert!(!past.completed().is_overdue(now));
        assert!(!Item::new(None, "whenever").unwrap().is_overdue(now));
        assert!(!Item::new(Some(now), "right now").unwrap().is_overdue(now));
    }
}
