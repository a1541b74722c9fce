//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define row-level data access contracts for the `items` table.
//! - Isolate SQLite query details from the store's staging logic.
//!
//! # Invariants
//! - Repository writes must enforce `Item::validate()` before persistence.
//! - Reads decode rows into typed items and reject malformed rows instead of
//!   masking them.

pub mod item_repo;
