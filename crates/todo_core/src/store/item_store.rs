//! Session-scoped item store with staged writes.
//!
//! # Invariants
//! - `fetch_all` queries storage at most once per session. Later calls return
//!   the same snapshot even after staging; a listing produced in the same
//!   session as a completion does not show that completion.
//! - Staged completes are copies; the snapshot is never mutated.
//! - Delete wins over complete for the same id (deletes are applied first
//!   and the later update matches no row).

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoError, SqliteItemRepository};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failures surfaced to the invoking layer.
#[derive(Debug)]
pub enum StoreError {
    /// Storage could not be opened or its schema could not be ensured.
    StorageUnavailable(DbError),
    /// Persisted items could not be read or decoded.
    StorageReadFailed(RepoError),
    /// The flush could not be applied; no staged change was saved.
    StorageWriteFailed(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "item storage unavailable: {err}"),
            Self::StorageReadFailed(err) => write!(f, "failed to read items: {err}"),
            Self::StorageWriteFailed(err) => {
                write!(f, "failed to save changes, no changes were saved: {err}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::StorageReadFailed(err) | Self::StorageWriteFailed(err) => Some(err),
        }
    }
}

/// How the session ended, as decided by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Flush every staged mutation.
    Success,
    /// Discard every staged mutation.
    Failure,
}

/// Effect of a successful close.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Rows actually deleted.
    pub deleted: usize,
    /// Rows actually updated.
    pub updated: usize,
    /// Ids assigned to staged creates, in staging order.
    pub inserted: Vec<ItemId>,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.deleted == 0 && self.updated == 0 && self.inserted.is_empty()
    }
}

/// Number of staged mutations per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl PendingCounts {
    pub fn total(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }
}

#[derive(Debug, Default)]
struct Staged {
    inserts: Vec<Item>,
    updates: Vec<Item>,
    deletes: Vec<Item>,
}

impl Staged {
    fn counts(&self) -> PendingCounts {
        PendingCounts {
            inserts: self.inserts.len(),
            updates: self.updates.len(),
            deletes: self.deletes.len(),
        }
    }
}

/// One store session over a SQLite database.
///
/// Close explicitly with [`ItemStore::close`]; dropping an open store
/// discards everything staged.
pub struct ItemStore {
    conn: Connection,
    snapshot: Option<Vec<Item>>,
    staged: Staged,
    closed: bool,
}

impl ItemStore {
    /// Opens (creating if absent) the item database at `path`.
    ///
    /// # Errors
    /// - [`StoreError::StorageUnavailable`] when the file cannot be opened or
    ///   the schema cannot be ensured.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path).map_err(StoreError::StorageUnavailable)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(StoreError::StorageUnavailable)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            snapshot: None,
            staged: Staged::default(),
            closed: false,
        }
    }

    /// Returns every persisted item, memoized for the rest of the session.
    ///
    /// Order: dated items by due time ascending, then undated items; ties by id.
    pub fn fetch_all(&mut self) -> StoreResult<&[Item]> {
        let items = match self.snapshot.take() {
            Some(items) => items,
            None => self.load_snapshot()?,
        };
        Ok(self.snapshot.insert(items).as_slice())
    }

    fn load_snapshot(&self) -> StoreResult<Vec<Item>> {
        let started_at = Instant::now();
        match SqliteItemRepository::new(&self.conn).list_items() {
            Ok(items) => {
                info!(
                    "event=store_fetch module=store status=ok count={} duration_ms={}",
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(items)
            }
            Err(err) => {
                error!(
                    "event=store_fetch module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::StorageReadFailed(err))
            }
        }
    }

    /// Looks `id` up in the memoized snapshot.
    pub fn find(&mut self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self
            .fetch_all()?
            .iter()
            .find(|item| item.id == Some(id))
            .cloned())
    }

    /// Stages `item` for insertion. Any id it carries is ignored.
    pub fn stage_create(&mut self, item: Item) {
        debug!("event=store_stage module=store op=create");
        self.staged.inserts.push(Item { id: None, ..item });
    }

    /// Stages a done copy of `item`; `item` itself is left untouched.
    pub fn stage_complete(&mut self, item: &Item) {
        debug!(
            "event=store_stage module=store op=complete id={}",
            display_id(item.id)
        );
        self.staged.updates.push(item.completed());
    }

    pub fn stage_remove(&mut self, item: &Item) {
        debug!(
            "event=store_stage module=store op=remove id={}",
            display_id(item.id)
        );
        self.staged.deletes.push(item.clone());
    }

    pub fn pending(&self) -> PendingCounts {
        self.staged.counts()
    }

    /// Ends the session.
    ///
    /// On [`SessionOutcome::Success`] applies staged deletes, updates and
    /// inserts in that order inside one transaction. On
    /// [`SessionOutcome::Failure`] discards everything staged and returns an
    /// empty report.
    ///
    /// # Errors
    /// - [`StoreError::StorageWriteFailed`] when any part of the batch fails;
    ///   the transaction is rolled back so nothing staged is persisted.
    pub fn close(mut self, outcome: SessionOutcome) -> StoreResult<FlushReport> {
        self.closed = true;
        match outcome {
            SessionOutcome::Success => self.flush(),
            SessionOutcome::Failure => {
                self.discard("failure_outcome");
                Ok(FlushReport::default())
            }
        }
    }

    fn flush(&mut self) -> StoreResult<FlushReport> {
        let started_at = Instant::now();
        let pending = self.staged.counts();
        info!(
            "event=store_flush module=store status=start deletes={} updates={} inserts={}",
            pending.deletes, pending.updates, pending.inserts
        );

        match self.apply_staged() {
            Ok(report) => {
                info!(
                    "event=store_flush module=store status=ok deleted={} updated={} inserted={} duration_ms={}",
                    report.deleted,
                    report.updated,
                    report.inserted.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=store_flush module=store status=error duration_ms={} error_code=flush_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::StorageWriteFailed(err))
            }
        }
    }

    fn apply_staged(&mut self) -> Result<FlushReport, RepoError> {
        if self.staged.counts().total() == 0 {
            return Ok(FlushReport::default());
        }

        let staged = std::mem::take(&mut self.staged);
        let tx = self.conn.transaction()?;
        let mut report = FlushReport::default();
        {
            let repo = SqliteItemRepository::new(&tx);

            for id in staged.deletes.iter().filter_map(|item| item.id) {
                if repo.delete_item(id)? {
                    report.deleted += 1;
                }
            }
            for item in staged.updates.iter().filter(|item| item.id.is_some()) {
                if repo.update_item(item)? {
                    report.updated += 1;
                }
            }
            for item in &staged.inserts {
                report.inserted.push(repo.insert_item(item)?);
            }
        }
        tx.commit()?;

        Ok(report)
    }

    fn discard(&mut self, reason: &str) {
        let pending = std::mem::take(&mut self.staged).counts();
        info!(
            "event=store_rollback module=store status=ok reason={reason} discarded_deletes={} discarded_updates={} discarded_inserts={}",
            pending.deletes, pending.updates, pending.inserts
        );
    }
}

impl Drop for ItemStore {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!("event=store_rollback module=store status=warn reason=dropped_without_close");
        self.discard("dropped_without_close");
    }
}

fn display_id(id: Option<ItemId>) -> String {
    id.map_or_else(|| "unset".to_string(), |id| id.to_string())
}
