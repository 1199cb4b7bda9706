//! Slot store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide read/overwrite/clear over named slots.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Keys are non-blank.
//! - `write` is an upsert; there are no partial updates.
//! - The SQLite store refuses connections without the `slots` table.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SlotResult<T> = Result<T, SlotError>;

/// Slot persistence error.
#[derive(Debug)]
pub enum SlotError {
    Db(DbError),
    /// Slot key is blank.
    InvalidKey(String),
    /// Connection has not been migrated to include the slot table.
    MissingRequiredTable(&'static str),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Named single-value storage locations.
pub trait SlotStore {
    /// Returns the slot value, or `None` when it was never written.
    fn read(&self, key: &str) -> SlotResult<Option<String>>;
    /// Replaces the slot value.
    fn write(&mut self, key: &str, value: &str) -> SlotResult<()>;
    /// Removes the slot; no-op when absent.
    fn clear(&mut self, key: &str) -> SlotResult<()>;
}

impl<S: SlotStore + ?Sized> SlotStore for &mut S {
    fn read(&self, key: &str) -> SlotResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> SlotResult<()> {
        (**self).write(key, value)
    }

    fn clear(&mut self, key: &str) -> SlotResult<()> {
        (**self).clear(key)
    }
}

/// SQLite-backed slot store.
pub struct SqliteSlotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// Use [`crate::db::open_db`] or [`crate::db::open_db_in_memory`] to get one.
    pub fn try_new(conn: &'conn Connection) -> SlotResult<Self> {
        if !slots_table_exists(conn)? {
            return Err(SlotError::MissingRequiredTable("slots"));
        }
        Ok(Self { conn })
    }
}

impl SlotStore for SqliteSlotStore<'_> {
    fn read(&self, key: &str) -> SlotResult<Option<String>> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> SlotResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn clear(&mut self, key: &str) -> SlotResult<()> {
        validate_key(key)?;
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1;", [key])?;
        Ok(())
    }
}

pub(crate) fn validate_key(key: &str) -> SlotResult<()> {
    if key.trim().is_empty() {
        return Err(SlotError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn slots_table_exists(conn: &Connection) -> SlotResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'slots'
        );",
        [],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
