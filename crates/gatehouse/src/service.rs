//! Visitor service.
//!
//! Turns registration, status and delete requests into [`RecordStore`]
//! calls and enforces the business rules around them:
//!
//! - input is normalized and validated before the store is touched;
//! - IC number and license plate uniqueness is left to the store, so racing
//!   registrations resolve to exactly one winner;
//! - only `Active` and `Left` ever reach the store;
//! - an id that does not resolve to a live record is [`Error::NotFound`].
//!
//! The service never retries. A registration that failed with
//! [`ErrorKind::StorageUnavailable`](crate::error::ErrorKind) may or may not
//! have been applied, so repeating it is the caller's decision.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::{Config, FacilityConfig};
use crate::error::{Error, Result};
use crate::health::HealthReport;
use crate::occupancy::Occupancy;
use crate::store::{RecordStore, SqliteStore};
use crate::visitor::{NewVisitor, Visitor, VisitorId, VisitorStatus};

#[derive(Debug)]
enum Backend<S> {
    Connected(S),
    /// The store could not be opened at startup.
    Unavailable { reason: String },
}

/// The visitor record service.
///
/// Constructed once at startup and shared by reference. If the store could
/// not be reached at startup the service is degraded: every operation fails
/// with [`Error::StorageUnavailable`] and [`health`](Self::health) says so.
#[derive(Debug)]
pub struct VisitorService<S = SqliteStore> {
    backend: Backend<S>,
    facility: FacilityConfig,
}

impl VisitorService<SqliteStore> {
    /// Open the configured database and build a service around it.
    ///
    /// Never fails: a store that cannot be opened yields a degraded service.
    #[must_use]
    pub fn connect(config: &Config) -> Self {
        let path = config.database_path();
        let service = match SqliteStore::open(
            &path,
            config.busy_timeout(),
            config.operation_timeout(),
        ) {
            Ok(store) => {
                info!("Connected to visitor store at {}", path.display());
                Self::with_store(store)
            }
            Err(err) => {
                error!("Visitor store at {} is unavailable: {err}", path.display());
                Self::unavailable(err.to_string())
            }
        };
        service.with_facility(config.facility.clone())
    }
}

impl<S: RecordStore> VisitorService<S> {
    /// Build a service over an already-open store.
    #[must_use]
    pub fn with_store(store: S) -> Self {
        Self {
            backend: Backend::Connected(store),
            facility: FacilityConfig::default(),
        }
    }

    /// Build a degraded service whose store failed to open.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unavailable {
                reason: reason.into(),
            },
            facility: FacilityConfig::default(),
        }
    }

    /// Use a specific facility layout for occupancy reporting.
    #[must_use]
    pub fn with_facility(mut self, facility: FacilityConfig) -> Self {
        self.facility = facility;
        self
    }

    /// Whether a store was connected at startup.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.backend, Backend::Connected(_))
    }

    fn store(&self) -> Result<&S> {
        match &self.backend {
            Backend::Connected(store) => Ok(store),
            Backend::Unavailable { reason } => Err(Error::unavailable(reason.clone())),
        }
    }

    /// Register a visitor.
    ///
    /// The new record is `Active`, with `registered_at == last_updated`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if a field is empty.
    /// - [`Error::DuplicateKey`] if the IC number or license plate is taken.
    /// - [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn create(&self, request: NewVisitor) -> Result<Visitor> {
        let request = request.normalize()?;
        let store = self.store()?;

        match store.insert(request, Utc::now()).await {
            Ok(visitor) => {
                info!(
                    id = %visitor.id,
                    license_plate = %visitor.license_plate,
                    unit = %visitor.unit_number,
                    "Registered visitor"
                );
                Ok(visitor)
            }
            Err(err) => {
                if err.is_duplicate() {
                    warn!("Registration rejected: {err}");
                } else {
                    error!("Registration failed: {err}");
                }
                Err(err)
            }
        }
    }

    /// All live visitors, newest registration first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn list(&self) -> Result<Vec<Visitor>> {
        self.store()?.fetch_all().await
    }

    /// Look up one visitor.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no live record has this id.
    /// - [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn get(&self, id: VisitorId) -> Result<Visitor> {
        self.store()?
            .fetch(id)
            .await?
            .ok_or(Error::NotFound { id })
    }

    /// Change a visitor's status from its text form.
    ///
    /// The status is checked before the store is touched, so an invalid
    /// status is reported even for an id that does not exist.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStatus`] if `status` is not `Active` or `Left`.
    /// - [`Error::NotFound`] if no live record has this id.
    /// - [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn update_status(&self, id: VisitorId, status: &str) -> Result<Visitor> {
        let status = status.parse::<VisitorStatus>()?;
        self.set_status(id, status).await
    }

    /// Change a visitor's status.
    ///
    /// Setting the status a visitor already has is not an error; only
    /// `last_updated` moves.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no live record has this id.
    /// - [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn set_status(&self, id: VisitorId, status: VisitorStatus) -> Result<Visitor> {
        let visitor = self
            .store()?
            .update_status(id, status, Utc::now())
            .await?
            .ok_or(Error::NotFound { id })?;

        info!(id = %id, status = %status, "Updated visitor status");
        Ok(visitor)
    }

    /// Permanently delete a visitor.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no live record has this id, including one
    ///   that was already deleted.
    /// - [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn delete(&self, id: VisitorId) -> Result<()> {
        if self.store()?.remove(id).await? {
            info!(id = %id, "Deleted visitor");
            Ok(())
        } else {
            Err(Error::NotFound { id })
        }
    }

    /// Parking occupancy across the live visitor set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the store cannot be reached.
    pub async fn occupancy(&self) -> Result<Occupancy> {
        let visitors = self.list().await?;
        Ok(Occupancy::from_visitors(
            &visitors,
            self.facility.total_parking_spots,
            self.facility.low_availability_threshold,
        ))
    }

    /// Check whether the store is reachable right now.
    pub async fn health(&self) -> HealthReport {
        let store = match &self.backend {
            Backend::Connected(store) => store,
            Backend::Unavailable { reason } => {
                return HealthReport::unreachable(format!("store failed at startup: {reason}"));
            }
        };

        match store.ping().await {
            Ok(()) => HealthReport::healthy("store reachable"),
            Err(err) => {
                error!("Health check failed: {err}");
                HealthReport::unreachable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::{ErrorKind, UniqueField};

    fn service() -> VisitorService {
        crate::logging::init_test_logging();
        VisitorService::with_store(SqliteStore::in_memory(Duration::from_secs(5)).unwrap())
    }

    fn alice() -> NewVisitor {
        NewVisitor::new("Alice", "901231-14-5678", "ABC1234", "A-1-01")
    }

    #[tokio::test]
    async fn test_create_sets_defaults() {
        let service = service();
        let visitor = service.create(alice()).await.unwrap();

        assert_eq!(visitor.status, VisitorStatus::Active);
        assert_eq!(visitor.registered_at, visitor.last_updated);
        assert_eq!(visitor.ic_number, "901231-14-5678");
    }

    #[tokio::test]
    async fn test_create_validates_before_storage() {
        let service: VisitorService<SqliteStore> = VisitorService::unavailable("offline");
        let err = service
            .create(NewVisitor::new("", "IC", "P", "U"))
            .await
            .unwrap_err();

        // Validation wins even though the store is down.
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_normalizes_keys() {
        let service = service();
        service.create(alice()).await.unwrap();

        let err = service
            .create(NewVisitor::new("Bob", "800101-01-0001", " abc1234 ", "B-2-02"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::DuplicateKey {
                field: UniqueField::LicensePlate,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let err = service().get(VisitorId::new(404)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_status_round_trip() {
        let service = service();
        let created = service.create(alice()).await.unwrap();

        let left = service.update_status(created.id, "Left").await.unwrap();
        assert_eq!(left.status, VisitorStatus::Left);

        let back = service.update_status(created.id, "active").await.unwrap();
        assert_eq!(back.status, VisitorStatus::Active);
        assert_eq!(back.registered_at, created.registered_at);
    }

    #[tokio::test]
    async fn test_update_status_invalid_value() {
        let service = service();
        let created = service.create(alice()).await.unwrap();

        let err = service.update_status(created.id, "Gone").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);

        let unchanged = service.get(created.id).await.unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn test_update_status_missing_id() {
        let err = service()
            .update_status(VisitorId::new(7), "Left")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = service();
        let created = service.create(alice()).await.unwrap();

        service.delete(created.id).await.unwrap();
        let err = service.delete(created.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_degraded_service_fails_everything() {
        let service: VisitorService<SqliteStore> = VisitorService::unavailable("connection refused");
        assert!(!service.is_available());

        let id = VisitorId::new(1);
        let errors = [
            service.create(alice()).await.unwrap_err(),
            service.list().await.unwrap_err(),
            service.get(id).await.unwrap_err(),
            service.update_status(id, "Left").await.unwrap_err(),
            service.delete(id).await.unwrap_err(),
            service.occupancy().await.unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        }

        let health = service.health().await;
        assert!(!health.ok);
        assert!(health.detail.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_health_when_connected() {
        let health = service().health().await;
        assert!(health.ok);
        assert!(health.store_reachable);
    }

    #[tokio::test]
    async fn test_occupancy_uses_facility() {
        let service = service().with_facility(FacilityConfig {
            total_parking_spots: 4,
            low_availability_threshold: 2,
        });
        let first = service.create(alice()).await.unwrap();
        service
            .create(NewVisitor::new("Bob", "IC-2", "PLATE2", "B-1"))
            .await
            .unwrap();
        service.set_status(first.id, VisitorStatus::Left).await.unwrap();

        let occupancy = service.occupancy().await.unwrap();
        assert_eq!(occupancy.active, 1);
        assert_eq!(occupancy.left, 1);
        assert_eq!(occupancy.available_spots, 3);
    }

    #[tokio::test]
    async fn test_connect_with_unopenable_path_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut config = Config::default();
        config.storage.database_path = Some(blocker.join("visitors.db"));

        let service = VisitorService::connect(&config);
        assert!(!service.is_available());
        assert!(!service.health().await.ok);
    }

    #[tokio::test]
    async fn test_connect_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.database_path = Some(dir.path().join("visitors.db"));

        let service = VisitorService::connect(&config);
        assert!(service.is_available());
        service.create(alice()).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
