//! Free-text item entry parsing.
//!
//! # Responsibility
//! - Turn one raw input line (`<date> -- <text>` or plain `<text>`) into an
//!   item candidate, or a skip signal for blank/comment lines.
//! - Resolve human date expressions relative to an explicit `now`.
//!
//! # Invariants
//! - Parsing never fails: an unreadable date degrades to a dateless item.
//! - Only blank and `#` comment lines are dropped.

pub mod date;
pub mod line;
