//! Repository trait for tracked location data access.

use crate::domain::entities::{LocationPatch, LocationWrite, TrackedLocation, Upserted};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for tracked locations, keyed by device id.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLocationRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryLocationRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Reconciles one fix into the device's record as a single atomic step.
    ///
    /// Inserts the record when absent, otherwise merges per
    /// [`TrackedLocation::merge`]: `created_at` is preserved (or healed when
    /// missing) and `updated_at` never decreases. Two concurrent calls for the
    /// same device cannot both observe "absent".
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors; the record is left
    /// untouched.
    async fn upsert(&self, write: LocationWrite) -> Result<Upserted, AppError>;

    /// Point read of a device's record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_device(&self, device_id: &str) -> Result<Option<TrackedLocation>, AppError>;

    /// Lists records, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<TrackedLocation>, AppError>;

    /// Counts all records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Lists records produced by one share link, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_by_share_link(
        &self,
        share_link_id: &str,
    ) -> Result<Vec<TrackedLocation>, AppError>;

    /// Applies an administrator edit.
    ///
    /// Returns `Ok(None)` when the device has no record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update(
        &self,
        device_id: &str,
        patch: LocationPatch,
        now: i64,
    ) -> Result<Option<TrackedLocation>, AppError>;

    /// Removes a device's record. Returns `Ok(false)` if there was none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, device_id: &str) -> Result<bool, AppError>;
}
