//! Deferred unit-of-work item store.
//!
//! # Responsibility
//! - Own the storage connection for exactly one session.
//! - Serve a memoized snapshot of persisted items.
//! - Stage create/complete/remove requests in memory and apply them as one
//!   atomic batch when the session closes successfully.
//!
//! # Invariants
//! - Staging never touches storage and never fails.
//! - Flush order is deletes, then updates, then inserts, in one transaction.
//! - A session that ends in failure, or is dropped without `close`, leaves
//!   storage exactly as it was at open.

mod item_store;
mod session;

pub use item_store::{
    FlushReport, ItemStore, PendingCounts, SessionOutcome, StoreError, StoreResult,
};
pub use session::{with_session, SessionError};
