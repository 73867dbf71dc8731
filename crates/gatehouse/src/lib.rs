//! `gatehouse` - Visitor registration and parking status tracking
//!
//! This library provides the visitor record service: registration with
//! store-enforced uniqueness of IC numbers and license plates, the
//! `Active`/`Left` status lifecycle, permanent deletion, occupancy
//! reporting, and a health check over the backing store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod occupancy;
pub mod service;
pub mod storage;
pub mod store;
pub mod visitor;

pub use config::Config;
pub use error::{Error, ErrorKind, Result, UniqueField};
pub use health::HealthReport;
pub use logging::init_logging;
pub use occupancy::{Availability, Occupancy};
pub use service::VisitorService;
pub use storage::Storage;
pub use store::{RecordStore, SqliteStore};
pub use visitor::{NewVisitor, Visitor, VisitorId, VisitorStatus};
