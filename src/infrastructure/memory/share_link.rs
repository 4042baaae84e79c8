//! In-memory implementation of share link repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{NewShareLink, ShareLink, ShareLinkPatch};
use crate::domain::repositories::ShareLinkRepository;
use crate::error::AppError;

/// Share links keyed by id, plus a short code to id index.
///
/// Locks are always taken links-first, then codes.
#[derive(Default)]
pub struct MemoryShareLinkRepository {
    links: DashMap<String, ShareLink>,
    codes: DashMap<String, String>,
}

impl MemoryShareLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareLinkRepository for MemoryShareLinkRepository {
    async fn create(&self, new_link: NewShareLink) -> Result<ShareLink, AppError> {
        match self.links.entry(new_link.id.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Share link already exists",
                json!({ "id": new_link.id }),
            )),
            Entry::Vacant(entry) => {
                let link = ShareLink::from(new_link);
                entry.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ShareLink>, AppError> {
        Ok(self.links.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<ShareLink>, AppError> {
        let Some(id) = self.codes.get(code).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        self.find_by_id(&id).await
    }

    async fn list(&self) -> Result<Vec<ShareLink>, AppError> {
        let mut links: Vec<ShareLink> = self.links.iter().map(|e| e.value().clone()).collect();
        links.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(links)
    }

    async fn update(
        &self,
        id: &str,
        patch: ShareLinkPatch,
        now: i64,
    ) -> Result<Option<ShareLink>, AppError> {
        Ok(self.links.get_mut(id).map(|mut entry| {
            entry.apply_patch(&patch, now);
            entry.value().clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let Some((_, link)) = self.links.remove(id) else {
            return Ok(false);
        };

        if let Some(code) = &link.short_code {
            self.codes.remove(code);
        }

        Ok(true)
    }

    async fn assign_short_url(
        &self,
        id: &str,
        code: &str,
        short_url: &str,
        now: i64,
    ) -> Result<Option<ShareLink>, AppError> {
        let Some(mut link) = self.links.get_mut(id) else {
            return Ok(None);
        };

        if link.has_short_url() {
            return Ok(None);
        }

        match self.codes.entry(code.to_string()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": code }),
            )),
            Entry::Vacant(entry) => {
                entry.insert(id.to_string());
                link.short_code = Some(code.to_string());
                link.short_url = Some(short_url.to_string());
                link.updated_at = link.updated_at.max(now);
                Ok(Some(link.value().clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShareLinkDraft;

    fn new_link(id: &str, created_at: i64) -> NewShareLink {
        NewShareLink::from_draft(
            id.to_string(),
            ShareLinkDraft {
                name: format!("Link {id}"),
                ..Default::default()
            },
            created_at,
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryShareLinkRepository::new();
        repo.create(new_link("link-1", 1000)).await.unwrap();

        let found = repo.find_by_id("link-1").await.unwrap().unwrap();
        assert_eq!(found.url, "/track?id=link-1");

        let duplicate = repo.create(new_link("link-1", 2000)).await;
        assert!(matches!(duplicate.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = MemoryShareLinkRepository::new();
        repo.create(new_link("old", 1000)).await.unwrap();
        repo.create(new_link("new", 2000)).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_assign_short_url_once() {
        let repo = MemoryShareLinkRepository::new();
        repo.create(new_link("link-1", 1000)).await.unwrap();

        let assigned = repo
            .assign_short_url("link-1", "abc123", "https://x.test/s/abc123", 2000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assigned.short_code.as_deref(), Some("abc123"));
        assert_eq!(assigned.updated_at, 2000);

        let again = repo
            .assign_short_url("link-1", "zzz999", "https://x.test/s/zzz999", 3000)
            .await
            .unwrap();
        assert!(again.is_none());

        let by_code = repo.find_by_short_code("abc123").await.unwrap().unwrap();
        assert_eq!(by_code.id, "link-1");
        assert!(repo.find_by_short_code("zzz999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assign_short_url_conflict() {
        let repo = MemoryShareLinkRepository::new();
        repo.create(new_link("link-1", 1000)).await.unwrap();
        repo.create(new_link("link-2", 1000)).await.unwrap();
        repo.assign_short_url("link-1", "abc123", "https://x.test/s/abc123", 2000)
            .await
            .unwrap();

        let result = repo
            .assign_short_url("link-2", "abc123", "https://x.test/s/abc123", 2000)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
        assert!(!repo.find_by_id("link-2").await.unwrap().unwrap().has_short_url());
    }

    #[tokio::test]
    async fn test_delete_drops_short_code() {
        let repo = MemoryShareLinkRepository::new();
        repo.create(new_link("link-1", 1000)).await.unwrap();
        repo.assign_short_url("link-1", "abc123", "https://x.test/s/abc123", 2000)
            .await
            .unwrap();

        assert!(repo.delete("link-1").await.unwrap());
        assert!(!repo.delete("link-1").await.unwrap());
        assert!(repo.find_by_short_code("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_link() {
        let repo = MemoryShareLinkRepository::new();

        let result = repo
            .update("missing", ShareLinkPatch::default(), 1000)
            .await
            .unwrap();

        assert!(result.is_none());
    }
}
