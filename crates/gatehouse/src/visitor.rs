//! Core visitor types for gatehouse.
//!
//! This module defines the visitor record, its status vocabulary, and the
//! registration input that produces a new record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier assigned by the store when a visitor is registered.
///
/// Identifiers are never reused, even after the record is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(i64);

impl VisitorId {
    /// Wrap a raw store identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw store identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VisitorId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::validation("id", format!("'{s}' is not a visitor id")))
    }
}

/// Whether a visitor is still on the premises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VisitorStatus {
    /// The visitor is parked on site.
    #[default]
    Active,
    /// The visitor has left.
    Left,
}

impl VisitorStatus {
    /// Every status a record may carry.
    pub const ALL: [Self; 2] = [Self::Active, Self::Left];

    /// Canonical text form, as persisted and exchanged.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Left => "Left",
        }
    }
}

impl fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitorStatus {
    type Err = Error;

    /// Parses `Active` or `Left`, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidStatus {
                value: s.to_string(),
            })
    }
}

/// A registration request, before the store has assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisitor {
    /// Visitor's name.
    pub name: String,
    /// Identity card number, unique among live records.
    pub ic_number: String,
    /// Vehicle license plate, unique among live records.
    pub license_plate: String,
    /// Unit being visited.
    pub unit_number: String,
}

impl NewVisitor {
    /// Create a registration request from its four fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ic_number: impl Into<String>,
        license_plate: impl Into<String>,
        unit_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ic_number: ic_number.into(),
            license_plate: license_plate.into(),
            unit_number: unit_number.into(),
        }
    }

    /// Trim every field and upper-case the two uniqueness keys.
    ///
    /// Upper-casing makes `abc1234` and `ABC1234` the same plate as far as
    /// the uniqueness constraints are concerned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that is empty
    /// after trimming.
    pub fn normalize(self) -> Result<Self> {
        let normalized = Self {
            name: self.name.trim().to_string(),
            ic_number: self.ic_number.trim().to_uppercase(),
            license_plate: self.license_plate.trim().to_uppercase(),
            unit_number: self.unit_number.trim().to_string(),
        };

        for (field, value) in [
            ("name", &normalized.name),
            ("ic_number", &normalized.ic_number),
            ("license_plate", &normalized.license_plate),
            ("unit_number", &normalized.unit_number),
        ] {
            if value.is_empty() {
                return Err(Error::validation(field, "must not be empty"));
            }
        }

        Ok(normalized)
    }
}

/// A live visitor record.
///
/// Field order matches the external representation: id, name, `ic_number`,
/// `license_plate`, `unit_number`, status, `registered_at`, `last_updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    /// Store-assigned identifier.
    pub id: VisitorId,
    /// Visitor's name.
    pub name: String,
    /// Identity card number.
    pub ic_number: String,
    /// Vehicle license plate.
    pub license_plate: String,
    /// Unit being visited.
    pub unit_number: String,
    /// Current status.
    pub status: VisitorStatus,
    /// When the visitor was registered. Never changes.
    pub registered_at: DateTime<Utc>,
    /// When the record was last written.
    pub last_updated: DateTime<Utc>,
}

impl Visitor {
    /// Whether the visitor is still parked on site.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == VisitorStatus::Active
    }
}
