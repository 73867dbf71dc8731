//! The record store boundary.
//!
//! [`RecordStore`] is the interface the visitor service drives. The store is
//! the source of truth for uniqueness and for the atomicity of each single
//! mutation. [`SqliteStore`] implements it over [`Storage`], running each
//! call on the blocking pool under a bounded wait.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::visitor::{NewVisitor, Visitor, VisitorId, VisitorStatus};

/// A persistent store of visitor records.
///
/// Implementations must reject an insert that would duplicate the IC number
/// or license plate of a live record with [`Error::DuplicateKey`], and must
/// apply each call as a single atomic unit.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record with status `Active`, stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] on a uniqueness violation, or an
    /// error if the store cannot complete the write.
    async fn insert(&self, visitor: NewVisitor, now: DateTime<Utc>) -> Result<Visitor>;

    /// Every live record, newest registration first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn fetch_all(&self) -> Result<Vec<Visitor>>;

    /// One record by id, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn fetch(&self, id: VisitorId) -> Result<Option<Visitor>>;

    /// Set a record's status and refresh `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot complete the write.
    async fn update_status(
        &self,
        id: VisitorId,
        status: VisitorStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Visitor>>;

    /// Permanently remove a record. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot complete the write.
    async fn remove(&self, id: VisitorId) -> Result<bool>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not answer.
    async fn ping(&self) -> Result<()>;
}

/// A process-wide, shareable [`RecordStore`] backed by `SQLite`.
///
/// Cloning is cheap; every clone talks to the same connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    storage: Arc<Mutex<Storage>>,
    timeout: Duration,
}

impl SqliteStore {
    /// Wrap an open [`Storage`], bounding every operation by `timeout`.
    #[must_use]
    pub fn new(storage: Storage, timeout: Duration) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            timeout,
        }
    }

    /// Open the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration, timeout: Duration) -> Result<Self> {
        Ok(Self::new(Storage::open(path, busy_timeout)?, timeout))
    }

    /// An in-memory store, for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn in_memory(timeout: Duration) -> Result<Self> {
        Ok(Self::new(Storage::open_in_memory()?, timeout))
    }

    /// Run `op` against the storage on the blocking pool.
    ///
    /// A timeout surfaces as [`Error::Timeout`]; a panicked task and a
    /// poisoned lock as [`Error::StorageUnavailable`]. Both classify as
    /// [`ErrorKind::StorageUnavailable`](crate::error::ErrorKind).
    async fn run<T, F>(&self, operation: &'static str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let task = tokio::task::spawn_blocking(move || {
            let guard = storage
                .lock()
                .map_err(|_| Error::unavailable("storage lock poisoned"))?;
            op(&guard)
        });

        debug!(operation, "store call");
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result.map_err(|err| unavailable_unless_domain(operation, err)),
            Ok(Err(join_err)) => {
                error!(operation, "store task failed: {join_err}");
                Err(Error::unavailable(format!("{operation} failed: {join_err}")))
            }
            Err(_) => {
                error!(
                    operation,
                    "store did not answer within {}ms",
                    self.timeout.as_millis()
                );
                Err(Error::Timeout {
                    operation,
                    timeout_ms: self.timeout.as_millis(),
                })
            }
        }
    }
}

/// Keep business-rule and unavailability errors as they are; everything else
/// means the store failed.
fn unavailable_unless_domain(operation: &'static str, err: Error) -> Error {
    match err {
        Error::DuplicateKey { .. }
        | Error::NotFound { .. }
        | Error::InvalidStatus { .. }
        | Error::Validation { .. }
        | Error::StorageUnavailable { .. }
        | Error::Timeout { .. } => err,
        other => {
            error!(operation, "store error: {other}");
            Error::unavailable(format!("{operation} failed: {other}"))
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, visitor: NewVisitor, now: DateTime<Utc>) -> Result<Visitor> {
        self.run("insert visitor", move |storage| storage.insert(&visitor, now))
            .await
    }

    async fn fetch_all(&self) -> Result<Vec<Visitor>> {
        self.run("list visitors", Storage::list).await
    }

    async fn fetch(&self, id: VisitorId) -> Result<Option<Visitor>> {
        self.run("get visitor", move |storage| storage.get(id)).await
    }

    async fn update_status(
        &self,
        id: VisitorId,
        status: VisitorStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Visitor>> {
        self.run("update visitor status", move |storage| {
            storage.update_status(id, status, now)
        })
        .await
    }

    async fn remove(&self, id: VisitorId) -> Result<bool> {
        self.run("delete visitor", move |storage| storage.delete(id))
            .await
    }

    async fn ping(&self) -> Result<()> {
        self.run("ping", Storage::ping).await
    }
}
