//! Predicate construction and evaluation.

use crate::model::item::Item;
use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug)]
pub enum FilterError {
    /// A search pattern is not a valid regular expression.
    InvalidPattern { pattern: String, message: String },
    /// Window start is not before window end.
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid search pattern `{pattern}`: {message}")
            }
            Self::EmptyWindow { start, end } => {
                write!(f, "due window start {start} must be before end {end}")
            }
        }
    }
}

impl Error for FilterError {}

/// Half-open description of the due-date window `(start, end)`.
///
/// Both bounds are exclusive when evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DueWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> FilterResult<Self> {
        if start >= end {
            return Err(FilterError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window from `now` through `now + days`.
    ///
    /// The end saturates at the last representable instant.
    pub fn upcoming(now: DateTime<Utc>, days: u32) -> Self {
        let end = now
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start: now, end }
    }

    /// Window that admits every representable due time.
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Undated items are never constrained by the window.
    pub fn admits(&self, due: Option<DateTime<Utc>>) -> bool {
        match due {
            None => true,
            Some(due) => self.start < due && due < self.end,
        }
    }
}

/// Listing criteria as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCriteria {
    pub show_done: bool,
    pub show_not_done: bool,
    pub window: DueWindow,
    /// Regular expressions; every one must match the item text.
    pub patterns: Vec<String>,
    pub ignore_case: bool,
}

impl ListCriteria {
    /// Open items due within the next `days` days, plus undated ones.
    pub fn upcoming(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            show_done: false,
            show_not_done: true,
            window: DueWindow::upcoming(now, days),
            patterns: Vec::new(),
            ignore_case: false,
        }
    }
}

/// Compiled form of [`ListCriteria`].
#[derive(Debug, Clone)]
pub struct Predicate {
    show_done: bool,
    show_not_done: bool,
    window: DueWindow,
    patterns: Vec<Regex>,
}

impl Predicate {
    /// Compiles all search patterns up front.
    ///
    /// # Errors
    /// - [`FilterError::InvalidPattern`] for the first pattern that fails to compile.
    pub fn build(criteria: &ListCriteria) -> FilterResult<Self> {
        let patterns = criteria
            .patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(criteria.ignore_case)
                    .build()
                    .map_err(|err| FilterError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: err.to_string(),
                    })
            })
            .collect::<FilterResult<Vec<_>>>()?;

        Ok(Self {
            show_done: criteria.show_done,
            show_not_done: criteria.show_not_done,
            window: criteria.window,
            patterns,
        })
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.is_visible(item)
            && self.window.admits(item.due)
            && self.patterns.iter().all(|re| re.is_match(&item.text))
    }

    fn is_visible(&self, item: &Item) -> bool {
        (item.done && self.show_done) || (!item.done && self.show_not_done)
    }
}

/// Status decoration shown next to a listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Done,
    Overdue,
    Pending,
}

impl Marker {
    pub fn for_item(item: &Item, now: DateTime<Utc>) -> Self {
        if item.done {
            Self::Done
        } else if item.is_overdue(now) {
            Self::Overdue
        } else {
            Self::Pending
        }
    }
}

/// Item selected for display, with its marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listed {
    #[serde(flatten)]
    pub item: Item,
    pub marker: Marker,
}

/// Filters `items` in order and decorates every included item.
pub fn select(items: &[Item], predicate: &Predicate, now: DateTime<Utc>) -> Vec<Listed> {
    items
        .iter()
        .filter(|item| predicate.matches(item))
        .map(|item| Listed {
            item: item.clone(),
            marker: Marker::for_item(item, now),
        })
        .collect()
}
