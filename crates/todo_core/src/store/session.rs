//! Scoped session bracket: open, run, then flush or roll back.

use super::item_store::{FlushReport, ItemStore, SessionOutcome, StoreError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Failure of a [`with_session`] run.
#[derive(Debug)]
pub enum SessionError<E> {
    /// The store could not be opened; nothing ran.
    Open(StoreError),
    /// The session body failed; all staged work was discarded.
    Body(E),
    /// The body succeeded but the flush failed; all staged work was lost.
    Flush(StoreError),
}

impl<E: Display> Display for SessionError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) | Self::Flush(err) => write!(f, "{err}"),
            Self::Body(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for SessionError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Flush(err) => Some(err),
            Self::Body(err) => Some(err),
        }
    }
}

impl<E> SessionError<E> {
    /// Whether the caller must be told that nothing was saved.
    pub fn lost_changes(&self) -> bool {
        matches!(self, Self::Body(_) | Self::Flush(_))
    }
}

/// Runs `body` against a store session opened at `path`.
///
/// Closes with [`SessionOutcome::Success`] when `body` returns `Ok`, and with
/// [`SessionOutcome::Failure`] otherwise. A panic inside `body` unwinds
/// through the store's `Drop`, which also discards staged work.
pub fn with_session<T, E, F>(
    path: impl AsRef<Path>,
    body: F,
) -> Result<(T, FlushReport), SessionError<E>>
where
    F: FnOnce(&mut ItemStore) -> Result<T, E>,
{
    let store = ItemStore::open(path).map_err(SessionError::Open)?;
    run_session(store, body)
}

pub(crate) fn run_session<T, E, F>(
    mut store: ItemStore,
    body: F,
) -> Result<(T, FlushReport), SessionError<E>>
where
    F: FnOnce(&mut ItemStore) -> Result<T, E>,
{
    match body(&mut store) {
        Ok(value) => {
            let report = store
                .close(SessionOutcome::Success)
                .map_err(SessionError::Flush)?;
            Ok((value, report))
        }
        Err(err) => {
            if let Err(close_err) = store.close(SessionOutcome::Failure) {
                warn!(
                    "event=store_rollback module=store status=error error={}",
                    close_err
                );
            }
            Err(SessionError::Body(err))
        }
    }
}
