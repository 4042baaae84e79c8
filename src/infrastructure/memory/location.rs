//! In-memory implementation of location repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{
    LocationPatch, LocationWrite, TrackedLocation, UpsertOutcome, Upserted,
};
use crate::domain::repositories::LocationRepository;
use crate::error::AppError;

/// Tracked locations keyed by device id.
///
/// The upsert runs inside `DashMap::entry`, which holds the shard's write
/// lock for the whole merge, so concurrent fixes for one device serialize.
#[derive(Default)]
pub struct MemoryLocationRepository {
    locations: DashMap<String, TrackedLocation>,
}

impl MemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut locations: Vec<TrackedLocation>) -> Vec<TrackedLocation> {
        locations.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.device_id.cmp(&b.device_id))
        });
        locations
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn upsert(&self, write: LocationWrite) -> Result<Upserted, AppError> {
        let upserted = match self.locations.entry(write.device_id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge(&write);
                Upserted {
                    location: entry.get().clone(),
                    outcome: UpsertOutcome::Merged,
                }
            }
            Entry::Vacant(entry) => {
                let location = TrackedLocation::first_seen(&write);
                entry.insert(location.clone());
                Upserted {
                    location,
                    outcome: UpsertOutcome::Inserted,
                }
            }
        };

        Ok(upserted)
    }

    async fn find_by_device(&self, device_id: &str) -> Result<Option<TrackedLocation>, AppError> {
        Ok(self.locations.get(device_id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<TrackedLocation>, AppError> {
        let all = Self::sorted(self.locations.iter().map(|e| e.value().clone()).collect());

        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.locations.len() as i64)
    }

    async fn list_by_share_link(
        &self,
        share_link_id: &str,
    ) -> Result<Vec<TrackedLocation>, AppError> {
        let matching = self
            .locations
            .iter()
            .filter(|e| e.share_link_id.as_deref() == Some(share_link_id))
            .map(|e| e.value().clone())
            .collect();

        Ok(Self::sorted(matching))
    }

    async fn update(
        &self,
        device_id: &str,
        patch: LocationPatch,
        now: i64,
    ) -> Result<Option<TrackedLocation>, AppError> {
        Ok(self.locations.get_mut(device_id).map(|mut entry| {
            entry.apply_patch(&patch, now);
            entry.value().clone()
        }))
    }

    async fn delete(&self, device_id: &str) -> Result<bool, AppError> {
        Ok(self.locations.remove(device_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DeviceMetadata, PositionSample};
    use std::sync::Arc;

    fn write_at(device_id: &str, lat: f64, lng: f64, now: i64) -> LocationWrite {
        LocationWrite {
            device_id: device_id.to_string(),
            sample: PositionSample::new(lat, lng),
            metadata: DeviceMetadata::default(),
            now,
        }
    }

    #[tokio::test]
    async fn test_first_fix_inserts() {
        let repo = MemoryLocationRepository::new();

        let upserted = repo.upsert(write_at("abc-123", 10.0, 20.0, 1000)).await.unwrap();

        assert_eq!(upserted.outcome, UpsertOutcome::Inserted);
        assert_eq!(upserted.location.created_at, Some(1000));
        assert_eq!(upserted.location.updated_at, 1000);
    }

    #[tokio::test]
    async fn test_second_fix_merges() {
        let repo = MemoryLocationRepository::new();
        repo.upsert(write_at("abc-123", 10.0, 20.0, 1000)).await.unwrap();

        let upserted = repo.upsert(write_at("abc-123", 10.1, 20.1, 2000)).await.unwrap();

        assert_eq!(upserted.outcome, UpsertOutcome::Merged);
        assert_eq!(upserted.location.latitude, 10.1);
        assert_eq!(upserted.location.created_at, Some(1000));
        assert_eq!(upserted.location.updated_at, 2000);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_created_at_is_healed() {
        let repo = MemoryLocationRepository::new();
        repo.upsert(write_at("abc-123", 10.0, 20.0, 1000)).await.unwrap();
        if let Some(mut entry) = repo.locations.get_mut("abc-123") {
            entry.created_at = None;
        }

        let upserted = repo.upsert(write_at("abc-123", 10.0, 20.0, 7000)).await.unwrap();

        assert_eq!(upserted.location.created_at, Some(7000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_fixes_insert_once() {
        let repo = Arc::new(MemoryLocationRepository::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.upsert(write_at("abc-123", 10.0, 20.0, 1000 + i))
                        .await
                        .unwrap()
                        .outcome
                })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() == UpsertOutcome::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        let stored = repo.find_by_device("abc-123").await.unwrap().unwrap();
        assert_eq!(stored.updated_at, 1031);
        assert!(stored.created_at.is_some_and(|c| (1000..=1031).contains(&c)));
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_at_desc() {
        let repo = MemoryLocationRepository::new();
        repo.upsert(write_at("a", 1.0, 1.0, 1000)).await.unwrap();
        repo.upsert(write_at("b", 1.0, 1.0, 3000)).await.unwrap();
        repo.upsert(write_at("c", 1.0, 1.0, 2000)).await.unwrap();

        let ids: Vec<String> = repo
            .list(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.device_id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let second_page = repo.list(2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].device_id, "a");
    }

    #[tokio::test]
    async fn test_list_by_share_link() {
        let repo = MemoryLocationRepository::new();
        let mut linked = write_at("a", 1.0, 1.0, 1000);
        linked.metadata.share_link_id = Some("link-1".to_string());
        repo.upsert(linked).await.unwrap();
        repo.upsert(write_at("b", 1.0, 1.0, 1000)).await.unwrap();

        let found = repo.list_by_share_link("link-1").await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].device_id, "a");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = MemoryLocationRepository::new();
        repo.upsert(write_at("abc-123", 10.0, 20.0, 1000)).await.unwrap();

        let patch = LocationPatch {
            nickname: Some("Alice".to_string()),
            ..Default::default()
        };
        let updated = repo.update("abc-123", patch, 1500).await.unwrap().unwrap();
        assert_eq!(updated.nickname, "Alice");
        assert_eq!(updated.created_at, Some(1000));

        assert!(
            repo.update("missing", LocationPatch::default(), 1500)
                .await
                .unwrap()
                .is_none()
        );

        assert!(repo.delete("abc-123").await.unwrap());
        assert!(!repo.delete("abc-123").await.unwrap());
        assert!(repo.find_by_device("abc-123").await.unwrap().is_none());
    }
}
