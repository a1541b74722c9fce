//! Core of the `todo` task tracker.
//!
//! Owns the item model, the entry-line parser, the listing filter and the
//! deferred item store that batches one invocation's mutations into a
//! single atomic write.

pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod parse;
pub mod repo;
pub mod service;
pub mod store;

pub use filter::predicate::{
    select, DueWindow, FilterError, FilterResult, ListCriteria, Listed, Marker, Predicate,
};
pub use logging::{default_log_level, init_logging};
pub use model::item::{Item, ItemId, ItemValidationError};
pub use parse::date::parse_date;
pub use parse::line::{parse_line, LineOutcome};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::todo_service::{
    apply_request, RequestReport, ServiceError, ServiceResult, TodoRequest,
};
pub use store::{
    with_session, FlushReport, ItemStore, PendingCounts, SessionError, SessionOutcome,
    StoreError, StoreResult,
};
