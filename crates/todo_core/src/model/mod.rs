//! Task item domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by parser, filter and store.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterwards.
//! - Item text is never empty.
//! - `done` only ever moves from `false` to `true`.

pub mod item;
