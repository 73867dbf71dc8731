//! `SQLite` schema definitions for gatehouse.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the visitors table.
///
/// `AUTOINCREMENT` keeps ids from being reused after a delete, and the
/// `CHECK` constraint keeps anything but the two statuses out of the table.
pub const CREATE_VISITORS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS visitors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    ic_number TEXT NOT NULL,
    license_plate TEXT NOT NULL,
    unit_number TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('Active', 'Left')),
    registered_at TEXT NOT NULL,
    last_updated TEXT NOT NULL CHECK (last_updated >= registered_at)
)
";

/// Unique index on `ic_number`.
pub const CREATE_IC_NUMBER_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_visitors_ic_number ON visitors(ic_number)
";

/// Unique index on `license_plate`.
pub const CREATE_LICENSE_PLATE_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_visitors_license_plate ON visitors(license_plate)
";

/// Index on `unit_number` for per-unit lookups.
pub const CREATE_UNIT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_visitors_unit ON visitors(unit_number)
";

/// Index on `registered_at` for the newest-first listing.
pub const CREATE_REGISTERED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_visitors_registered_at ON visitors(registered_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_VISITORS_TABLE,
    CREATE_IC_NUMBER_INDEX,
    CREATE_LICENSE_PLATE_INDEX,
    CREATE_UNIT_INDEX,
    CREATE_REGISTERED_AT_INDEX,
    CREATE_METADATA_TABLE,
];
