//! `items` table layout, ensured on every open.
//!
//! The layout is idempotent DDL, so re-running it against an existing file
//! keeps every row. `PRAGMA user_version` records the layout revision so a
//! file written by a newer build is refused instead of half-understood.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Layout revision stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the `items` table and its due index when absent.
///
/// # Errors
/// - [`DbError::SchemaTooNew`] when the file carries a later revision.
/// - [`DbError::Sqlite`] when the DDL cannot be applied.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    if found < SCHEMA_VERSION {
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    tx.commit()?;
    Ok(())
}
