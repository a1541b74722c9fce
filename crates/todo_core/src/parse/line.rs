//! Single-line item entry parser.
//!
//! # Invariants
//! - Blank lines and `#` comments yield [`LineOutcome::Skip`].
//! - The first `--` separates the date segment from the text.
//! - A date segment that does not parse keeps the whole line as text, without
//!   a due time.

use super::date::parse_date;
use crate::model::item::Item;
use chrono::{DateTime, TimeZone};

const DATE_SEPARATOR: &str = "--";
const COMMENT_PREFIX: char = '#';

/// Result of parsing one raw input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Unpersisted item candidate.
    Item(Item),
    /// Line intentionally produces no item.
    Skip,
}

impl LineOutcome {
    pub fn into_item(self) -> Option<Item> {
        match self {
            Self::Item(item) => Some(item),
            Self::Skip => None,
        }
    }
}

/// Parses `<date> -- <text>` or `<text>` into an item candidate.
pub fn parse_line<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>) -> LineOutcome {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return LineOutcome::Skip;
    }

    let dated = line.split_once(DATE_SEPARATOR).and_then(|(date, text)| {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        parse_date(date, now).map(|due| (due, text))
    });

    let item = match dated {
        Some((due, text)) => Item::new(Some(due), text),
        None => Item::new(None, line),
    };
    item.map_or(LineOutcome::Skip, LineOutcome::Item)
}
