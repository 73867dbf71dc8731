//! Storage layer for gatehouse.
//!
//! This module provides `SQLite`-based persistent storage for visitor
//! records. Uniqueness of IC numbers and license plates is enforced by
//! unique indexes, so racing registrations are decided here and not by
//! a read-then-write check in the caller.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result, UniqueField};
use crate::visitor::{NewVisitor, Visitor, VisitorId, VisitorStatus};

const VISITOR_SELECT_SQL: &str = r"
SELECT id, name, ic_number, license_plate, unit_number, status, registered_at, last_updated
FROM visitors
";

/// Storage engine for visitor records.
#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Check that the database answers queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Insert a new visitor with status `Active`, stamped with `now`.
    ///
    /// Returns the record as persisted, including its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the IC number or license plate is
    /// already held by a live record, or an error if the database operation fails.
    pub fn insert(&self, visitor: &NewVisitor, now: DateTime<Utc>) -> Result<Visitor> {
        let stamp = format_timestamp(now);
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            r"
            INSERT INTO visitors
                (name, ic_number, license_plate, unit_number, status, registered_at, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ",
            params![
                visitor.name,
                visitor.ic_number,
                visitor.license_plate,
                visitor.unit_number,
                VisitorStatus::Active.as_str(),
                stamp,
            ],
        )
        .map_err(|err| map_unique_violation(err, visitor))?;

        let id = VisitorId::new(tx.last_insert_rowid());
        let record = fetch(&tx, id)?.ok_or_else(|| {
            Error::internal(format!("visitor {id} vanished between insert and read-back"))
        })?;
        tx.commit()?;

        debug!("Inserted visitor with id {}", id);
        Ok(record)
    }

    /// Get a visitor by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: VisitorId) -> Result<Option<Visitor>> {
        fetch(&self.conn, id)
    }

    /// Get every visitor, newest registration first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<Visitor>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VISITOR_SELECT_SQL} ORDER BY registered_at DESC, id DESC"
        ))?;

        let visitors = stmt
            .query_map([], row_to_visitor)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(visitors)
    }

    /// Set a visitor's status and refresh `last_updated`.
    ///
    /// `last_updated` never moves behind `registered_at`, even if the clock
    /// has stepped backwards since registration.
    ///
    /// Returns the updated record, or `None` if no visitor has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_status(
        &self,
        id: VisitorId,
        status: VisitorStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Visitor>> {
        let tx = self.conn.unchecked_transaction()?;

        let affected = tx.execute(
            r"
            UPDATE visitors
            SET status = ?1, last_updated = MAX(?2, registered_at)
            WHERE id = ?3
            ",
            params![status.as_str(), format_timestamp(now), id.get()],
        )?;

        if affected == 0 {
            return Ok(None);
        }

        let record = fetch(&tx, id)?;
        tx.commit()?;

        debug!("Set visitor {} status to {}", id, status);
        Ok(record)
    }

    /// Delete a visitor by id.
    ///
    /// Returns `true` if a visitor was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: VisitorId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM visitors WHERE id = ?1", [id.get()])?;
        Ok(affected > 0)
    }

}

fn fetch(conn: &Connection, id: VisitorId) -> Result<Option<Visitor>> {
    let record = conn
        .query_row(
            &format!("{VISITOR_SELECT_SQL} WHERE id = ?1"),
            [id.get()],
            row_to_visitor,
        )
        .optional()?;
    Ok(record)
}

/// Fixed-width RFC 3339 so that text comparison orders timestamps.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Convert a database row to a Visitor.
///
/// Corrupt status or timestamp values are surfaced as errors rather than
/// replaced with defaults.
fn row_to_visitor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Visitor> {
    let id: i64 = row.get(0)?;
    let status_str: String = row.get(5)?;
    let registered_at: String = row.get(6)?;
    let last_updated: String = row.get(7)?;

    let status = status_str.parse::<VisitorStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown visitor status: {status_str}").into(),
        )
    })?;

    Ok(Visitor {
        id: VisitorId::new(id),
        name: row.get(1)?,
        ic_number: row.get(2)?,
        license_plate: row.get(3)?,
        unit_number: row.get(4)?,
        status,
        registered_at: parse_timestamp(6, &registered_at)?,
        last_updated: parse_timestamp(7, &last_updated)?,
    })
}

/// Translate a unique-index violation into [`Error::DuplicateKey`].
fn map_unique_violation(err: rusqlite::Error, visitor: &NewVisitor) -> Error {
    // SQLite reports "UNIQUE constraint failed: visitors.<column>".
    let field = match &err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            [UniqueField::IcNumber, UniqueField::LicensePlate]
                .into_iter()
                .find(|field| message.contains(&format!("visitors.{}", field.column())))
        }
        _ => None,
    };

    match field {
        Some(field) => {
            let value = match field {
                UniqueField::IcNumber => visitor.ic_number.clone(),
                UniqueField::LicensePlate => visitor.license_plate.clone(),
            };
            Error::DuplicateKey { field, value }
        }
        None => err.into(),
    }
}
