//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed row access over the `items` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `list_items` order: dated items by `due ASC`, then undated items; ties
//!   broken by `id ASC`.
//! - Update/delete report whether a row changed instead of failing on a
//!   missing id, so a delete and an update of the same id can share a batch.

use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    due,
    text,
    done
FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and decoding.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    /// Write path received an item that has no storage id.
    MissingId,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId => write!(f, "item has not been persisted yet"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingId | Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row-level access to persisted items.
pub trait ItemRepository {
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Inserts an unpersisted item and returns the assigned id.
    fn insert_item(&self, item: &Item) -> RepoResult<ItemId>;
    /// Overwrites due/text/done of an existing row. Returns `false` when no
    /// row has the item's id.
    fn update_item(&self, item: &Item) -> RepoResult<bool>;
    /// Returns `false` when no row has `id`.
    fn delete_item(&self, id: ItemId) -> RepoResult<bool>;
}

/// SQLite-backed item repository.
///
/// Accepts any connection, including an open transaction (via deref), so
/// the store can run a whole batch inside one transaction.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} ORDER BY due IS NULL, due ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn insert_item(&self, item: &Item) -> RepoResult<ItemId> {
        item.validate()?;

        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO items (due, text, done) VALUES (?1, ?2, ?3);")?;
        stmt.execute(params![
            item.due.map(|due| due.timestamp_millis()),
            item.text.as_str(),
            bool_to_int(item.done),
        ])?;

        Ok(ItemId(self.conn.last_insert_rowid()))
    }

    fn update_item(&self, item: &Item) -> RepoResult<bool> {
        item.validate()?;
        let id = item.id.ok_or(RepoError::MissingId)?;

        let mut stmt = self.conn.prepare_cached(
            "UPDATE items
             SET
                due = ?1,
                text = ?2,
                done = ?3
             WHERE id = ?4;",
        )?;
        let changed = stmt.execute(params![
            item.due.map(|due| due.timestamp_millis()),
            item.text.as_str(),
            bool_to_int(item.done),
            id.0,
        ])?;

        Ok(changed > 0)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM items WHERE id = ?1;")?;
        let changed = stmt.execute([id.0])?;
        Ok(changed > 0)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id: i64 = row.get("id")?;

    let due = match row.get::<_, Option<i64>>("due")? {
        Some(millis) => Some(DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            RepoError::InvalidData(format!("out of range due value `{millis}` in items.due"))
        })?),
        None => None,
    };

    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in items.done"
            )));
        }
    };

    let item = Item {
        id: Some(ItemId(id)),
        due,
        text: row.get("text")?,
        done,
    };
    item.validate()?;
    Ok(item)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
