//! Request application for one invocation.
//!
//! # Responsibility
//! - Resolve requested ids against the store snapshot and stage
//!   complete/remove mutations.
//! - Parse raw entry lines and stage creates.
//! - Produce the optional listing from the snapshot.
//!
//! # Invariants
//! - The listing predicate is compiled before anything is staged, so a bad
//!   search pattern fails the request without side effects.
//! - The listing reflects the snapshot taken at the first read, not the
//!   mutations staged by the same request.
//! - Unknown ids are reported, never fatal.

use crate::filter::predicate::{select, FilterError, ListCriteria, Listed, Predicate};
use crate::model::item::ItemId;
use crate::parse::line::{parse_line, LineOutcome};
use crate::store::{ItemStore, StoreError};
use chrono::{DateTime, TimeZone, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Filter(FilterError),
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filter(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Filter(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<FilterError> for ServiceError {
    fn from(value: FilterError) -> Self {
        Self::Filter(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Everything one invocation asks the core to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoRequest {
    /// Ids to mark done.
    pub complete: Vec<ItemId>,
    /// Ids to delete.
    pub remove: Vec<ItemId>,
    /// Raw entry lines (`<date> -- <text>` or `<text>`).
    pub add_lines: Vec<String>,
    /// Listing criteria, when a listing was requested.
    pub list: Option<ListCriteria>,
}

impl TodoRequest {
    pub fn is_empty(&self) -> bool {
        self.complete.is_empty()
            && self.remove.is_empty()
            && self.add_lines.is_empty()
            && self.list.is_none()
    }
}

/// Outcome of applying a request, before the session flushes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestReport {
    pub completed: Vec<ItemId>,
    pub removed: Vec<ItemId>,
    pub created: usize,
    /// Blank and comment lines.
    pub skipped_lines: usize,
    pub unknown_ids: Vec<ItemId>,
    /// Present iff a listing was requested.
    pub listing: Option<Vec<Listed>>,
}

/// Applies `request` to an open store session.
///
/// Nothing is persisted here; the caller decides the session outcome.
pub fn apply_request<Tz: TimeZone>(
    store: &mut ItemStore,
    request: &TodoRequest,
    now: &DateTime<Tz>,
) -> ServiceResult<RequestReport> {
    let predicate = request.list.as_ref().map(Predicate::build).transpose()?;
    let mut report = RequestReport::default();

    for &id in &request.remove {
        match store.find(id)? {
            Some(item) => {
                store.stage_remove(&item);
                report.removed.push(id);
            }
            None => report.unknown_ids.push(id),
        }
    }

    for &id in &request.complete {
        // A removed item is gone; completing it too would report both.
        if report.removed.contains(&id) {
            continue;
        }
        match store.find(id)? {
            Some(item) => {
                store.stage_complete(&item);
                report.completed.push(id);
            }
            None => report.unknown_ids.push(id),
        }
    }

    for line in &request.add_lines {
        match parse_line(line, now) {
            LineOutcome::Item(item) => {
                store.stage_create(item);
                report.created += 1;
            }
            LineOutcome::Skip => report.skipped_lines += 1,
        }
    }

    if let Some(predicate) = predicate {
        let now_utc: DateTime<Utc> = now.with_timezone(&Utc);
        report.listing = Some(select(store.fetch_all()?, &predicate, now_utc));
    }

    for id in &report.unknown_ids {
        warn!("event=request_apply module=service status=warn reason=unknown_id id={id}");
    }
    info!(
        "event=request_apply module=service status=ok completed={} removed={} created={} skipped_lines={} unknown_ids={} listed={}",
        report.completed.len(),
        report.removed.len(),
        report.created,
        report.skipped_lines,
        report.unknown_ids.len(),
        report.listing.as_ref().map_or(0, Vec::len)
    );

    Ok(report)
}
