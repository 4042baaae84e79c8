//! Location reconciliation and admin management service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::clock::Clock;
use crate::domain::entities::{
    DeviceMetadata, LocationPatch, LocationWrite, PositionSample, TrackedLocation, Upserted,
};
use crate::domain::identity::is_valid_device_id;
use crate::domain::repositories::LocationRepository;
use crate::error::AppError;

/// One page of tracked locations plus the total record count.
#[derive(Debug, Clone)]
pub struct LocationPage {
    pub items: Vec<TrackedLocation>,
    pub total: i64,
}

/// Service owning the tracked location lifecycle.
///
/// Every fix goes through [`LocationService::upsert`], which stamps the write
/// with the injected clock and hands the merge to the repository as one atomic
/// step. A failed write is not retried here; the next fix from the same device
/// carries the same intent and converges the record.
pub struct LocationService<R: LocationRepository + ?Sized> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: LocationRepository + ?Sized> LocationService<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Current time from the injected clock, epoch millis.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Reconciles one fix into the device's record.
    ///
    /// Inserts with `created_at = updated_at = now` for an unseen device,
    /// otherwise merges keeping the original `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed device id or
    /// out-of-range coordinates; nothing is written.
    /// Returns [`AppError::Internal`] on storage errors; the record is unchanged.
    pub async fn upsert(
        &self,
        device_id: &str,
        sample: PositionSample,
        metadata: DeviceMetadata,
    ) -> Result<Upserted, AppError> {
        validate_device_id(device_id)?;
        sample.validate()?;

        let write = LocationWrite {
            device_id: device_id.to_string(),
            sample,
            metadata,
            now: self.clock.now_millis(),
        };

        let upserted = match self.repository.upsert(write).await {
            Ok(upserted) => upserted,
            Err(e) => {
                metrics::counter!("location_upserts_total", "outcome" => "failed").increment(1);
                tracing::error!(device_id, error = %e, "Location upsert failed");
                return Err(e);
            }
        };

        metrics::counter!("location_upserts_total", "outcome" => upserted.outcome.as_str())
            .increment(1);
        tracing::debug!(
            device_id,
            outcome = upserted.outcome.as_str(),
            updated_at = upserted.location.updated_at,
            "Location reconciled"
        );

        Ok(upserted)
    }

    /// Lists tracked locations, most recently updated first.
    ///
    /// `page` is 1-based.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list(&self, page: i64, page_size: i64) -> Result<LocationPage, AppError> {
        let offset = (page.max(1) - 1) * page_size;

        let items = self.repository.list(offset, page_size).await?;
        let total = self.repository.count().await?;

        Ok(LocationPage { items, total })
    }

    /// Counts tracked locations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Lists locations recorded against one share link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list_by_share_link(
        &self,
        share_link_id: &str,
    ) -> Result<Vec<TrackedLocation>, AppError> {
        self.repository.list_by_share_link(share_link_id).await
    }

    /// Looks up one device's record. A missing record is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn find(&self, device_id: &str) -> Result<Option<TrackedLocation>, AppError> {
        self.repository.find_by_device(device_id).await
    }

    /// Retrieves one device's record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the device has no record.
    pub async fn get(&self, device_id: &str) -> Result<TrackedLocation, AppError> {
        self.repository
            .find_by_device(device_id)
            .await?
            .ok_or_else(|| not_found(device_id))
    }

    /// Applies an administrator edit. `created_at` is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for out-of-range coordinates.
    /// Returns [`AppError::NotFound`] if the device has no record.
    pub async fn update(
        &self,
        device_id: &str,
        patch: LocationPatch,
    ) -> Result<TrackedLocation, AppError> {
        if let Some(latitude) = patch.latitude {
            PositionSample::new(latitude, 0.0).validate()?;
        }
        if let Some(longitude) = patch.longitude {
            PositionSample::new(0.0, longitude).validate()?;
        }

        let now = self.clock.now_millis();

        self.repository
            .update(device_id, patch, now)
            .await?
            .ok_or_else(|| not_found(device_id))
    }

    /// Deletes a device's record.
    ///
    /// The device starts over as unseen on its next fix.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the device has no record.
    pub async fn delete(&self, device_id: &str) -> Result<(), AppError> {
        if !self.repository.delete(device_id).await? {
            return Err(not_found(device_id));
        }

        tracing::info!(device_id, "Location deleted");
        Ok(())
    }
}

fn validate_device_id(device_id: &str) -> Result<(), AppError> {
    if is_valid_device_id(device_id) {
        return Ok(());
    }

    Err(AppError::bad_request(
        "Device id must be 1-128 characters of letters, digits, '-' or '_'",
        json!({ "device_id": device_id }),
    ))
}

fn not_found(device_id: &str) -> AppError {
    AppError::not_found("Location not found", json!({ "device_id": device_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::entities::UpsertOutcome;
    use crate::domain::repositories::MockLocationRepository;

    fn stored(device_id: &str, created_at: i64, updated_at: i64) -> TrackedLocation {
        TrackedLocation {
            device_id: device_id.to_string(),
            share_link_id: None,
            latitude: 10.0,
            longitude: 20.0,
            ip: None,
            device_type: None,
            user_agent: None,
            screen_width: None,
            screen_height: None,
            referrer: None,
            user_language: None,
            user_timezone: None,
            nickname: String::new(),
            created_at: Some(created_at),
            updated_at,
        }
    }

    fn service(repo: MockLocationRepository, now: i64) -> LocationService<MockLocationRepository> {
        LocationService::new(Arc::new(repo), Arc::new(ManualClock::new(now)))
    }

    #[tokio::test]
    async fn test_upsert_stamps_clock_time() {
        let mut mock_repo = MockLocationRepository::new();

        mock_repo
            .expect_upsert()
            .withf(|write| {
                write.device_id == "abc-123" && write.now == 1000 && write.sample.latitude == 10.0
            })
            .times(1)
            .returning(|write| {
                Ok(Upserted {
                    location: TrackedLocation::first_seen(&write),
                    outcome: UpsertOutcome::Inserted,
                })
            });

        let result = service(mock_repo, 1000)
            .upsert(
                "abc-123",
                PositionSample::new(10.0, 20.0),
                DeviceMetadata::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.outcome, UpsertOutcome::Inserted);
        assert_eq!(result.location.created_at, Some(1000));
        assert_eq!(result.location.updated_at, 1000);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_coordinates_without_write() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo.expect_upsert().times(0);

        let result = service(mock_repo, 1000)
            .upsert(
                "abc-123",
                PositionSample::new(91.0, 20.0),
                DeviceMetadata::default(),
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_device_id_without_write() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo.expect_upsert().times(0);

        let result = service(mock_repo, 1000)
            .upsert(
                "not a device",
                PositionSample::new(10.0, 20.0),
                DeviceMetadata::default(),
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_upsert_propagates_storage_error() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo
            .expect_upsert()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let result = service(mock_repo, 3000)
            .upsert(
                "abc-123",
                PositionSample::new(10.0, 20.0),
                DeviceMetadata::default(),
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_list_computes_offset() {
        let mut mock_repo = MockLocationRepository::new();

        mock_repo
            .expect_list()
            .withf(|offset, limit| *offset == 20 && *limit == 10)
            .times(1)
            .returning(|_, _| Ok(vec![stored("abc-123", 1000, 2000)]));
        mock_repo.expect_count().times(1).returning(|| Ok(21));

        let page = service(mock_repo, 0).list(3, 10).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 21);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo
            .expect_find_by_device()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(mock_repo, 0).get("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_separates_missing_from_storage_errors() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo
            .expect_find_by_device()
            .withf(|device_id| device_id == "missing")
            .returning(|_| Ok(None));
        mock_repo
            .expect_find_by_device()
            .withf(|device_id| device_id == "abc-123")
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        let service = service(mock_repo, 0);

        assert!(service.find("missing").await.unwrap().is_none());
        assert!(matches!(
            service.find("abc-123").await.unwrap_err(),
            AppError::Internal { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_validates_latitude() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo.expect_update().times(0);

        let patch = LocationPatch {
            latitude: Some(-95.0),
            ..Default::default()
        };

        let result = service(mock_repo, 0).update("abc-123", patch).await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_passes_clock_time() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo
            .expect_update()
            .withf(|device_id, patch, now| {
                device_id == "abc-123" && patch.nickname.as_deref() == Some("Alice") && *now == 5000
            })
            .times(1)
            .returning(|device_id, patch, now| {
                let mut location = stored(device_id, 1000, 2000);
                location.apply_patch(&patch, now);
                Ok(Some(location))
            });

        let patch = LocationPatch {
            nickname: Some("Alice".to_string()),
            ..Default::default()
        };

        let location = service(mock_repo, 5000)
            .update("abc-123", patch)
            .await
            .unwrap();

        assert_eq!(location.nickname, "Alice");
        assert_eq!(location.created_at, Some(1000));
        assert_eq!(location.updated_at, 5000);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut mock_repo = MockLocationRepository::new();
        mock_repo.expect_delete().times(1).returning(|_| Ok(false));

        let result = service(mock_repo, 0).delete("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }
}
