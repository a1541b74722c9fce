//! Listing filter engine.
//!
//! # Responsibility
//! - Compose visibility flags, a due-date window and text patterns into one
//!   predicate over items.
//! - Decorate listed items with a done/overdue/pending marker.
//!
//! # Invariants
//! - Evaluation is pure: no storage access, `now` is always passed in.
//! - Window bounds are strictly exclusive; undated items always pass them.

pub mod predicate;
