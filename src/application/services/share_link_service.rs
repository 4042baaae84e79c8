//! Share link management and short URL service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::{NewShareLink, ShareLink, ShareLinkDraft, ShareLinkPatch};
use crate::domain::repositories::ShareLinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_short_code, is_valid_short_code};

pub const DEFAULT_TRACK_TITLE: &str = "Live Location";
pub const DEFAULT_TRACK_DESCRIPTION: &str = "Share your live location.";
pub const DEFAULT_TRACK_IMAGE: &str = "https://cdn-icons-png.flaticon.com/512/174/174855.png";

/// Link preview metadata for a tracking page.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TRACK_TITLE.to_string(),
            description: DEFAULT_TRACK_DESCRIPTION.to_string(),
            image_url: DEFAULT_TRACK_IMAGE.to_string(),
        }
    }
}

/// Service for share link CRUD and lazily issued short URLs.
pub struct ShareLinkService<R: ShareLinkRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
}

impl<R: ShareLinkRepository + ?Sized> ShareLinkService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            cache,
            clock,
        }
    }

    /// Creates a share link with a fresh UUID and its `/track?id=` URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is blank.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create(&self, draft: ShareLinkDraft) -> Result<ShareLink, AppError> {
        if draft.name.trim().is_empty() {
            return Err(AppError::bad_request(
                "Share link name is required",
                json!({ "field": "name" }),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let new_link = NewShareLink::from_draft(id, draft, self.clock.now_millis());

        let link = self.repository.create(new_link).await?;
        tracing::info!(id = %link.id, name = %link.name, "Share link created");

        Ok(link)
    }

    /// Lists all share links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list(&self) -> Result<Vec<ShareLink>, AppError> {
        self.repository.list().await
    }

    /// Retrieves a share link by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn get(&self, id: &str) -> Result<ShareLink, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Partially updates a share link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is set to blank.
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn update(&self, id: &str, patch: ShareLinkPatch) -> Result<ShareLink, AppError> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(AppError::bad_request(
                "Share link name cannot be empty",
                json!({ "field": "name" }),
            ));
        }

        let now = self.clock.now_millis();

        self.repository
            .update(id, patch, now)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Deletes a share link and drops its cached short code mapping.
    ///
    /// Locations recorded against the link are kept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let link = self.get(id).await?;

        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }

        if let Some(code) = &link.short_code
            && let Err(e) = self.cache.invalidate(code).await
        {
            error!("Failed to invalidate cache for {}: {}", code, e);
        }

        tracing::info!(id, "Share link deleted");
        Ok(())
    }

    /// Issues a short URL for a share link, or returns the one already issued.
    ///
    /// Codes are 6-character lowercase base-36 strings; each draw is checked
    /// for uniqueness and retried up to 10 times. The result is
    /// `<base_url>/s/<code>`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::Internal`] if no free code was found.
    pub async fn generate_short_url(&self, id: &str, base_url: &str) -> Result<ShareLink, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        let link = self.get(id).await?;
        if link.has_short_url() {
            return Ok(link);
        }

        let base_url = base_url.trim_end_matches('/');

        for attempt in 1..=MAX_ATTEMPTS {
            let code = generate_short_code();

            if self.repository.find_by_short_code(&code).await?.is_some() {
                debug!(attempt, code = %code, "Short code collision");
                continue;
            }

            let short_url = format!("{}/s/{}", base_url, code);
            let now = self.clock.now_millis();

            match self
                .repository
                .assign_short_url(id, &code, &short_url, now)
                .await
            {
                Ok(Some(updated)) => {
                    metrics::counter!("short_urls_issued_total").increment(1);
                    tracing::info!(id, code = %code, "Short URL issued");
                    self.cache_mapping(&code, id);
                    return Ok(updated);
                }
                // Deleted or issued concurrently since the read above.
                Ok(None) => return self.get(id).await,
                Err(AppError::Conflict { .. }) => {
                    debug!(attempt, code = %code, "Short code taken during assignment");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "reason": "Too many collisions", "attempts": MAX_ATTEMPTS }),
        ))
    }

    /// Resolves a short code to the id of the share link it was issued for.
    ///
    /// The cache is consulted first; on a miss the mapping is read from
    /// storage and cached in the background.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for malformed or unknown codes.
    pub async fn resolve_short_code(&self, code: &str) -> Result<String, AppError> {
        if !is_valid_short_code(code) {
            return Err(short_code_not_found(code));
        }

        match self.cache.get_link_id(code).await {
            Ok(Some(link_id)) => return Ok(link_id),
            Ok(None) => debug!("Cache MISS for {}", code),
            Err(e) => error!("Cache error: {}", e),
        }

        let link = self
            .repository
            .find_by_short_code(code)
            .await?
            .ok_or_else(|| short_code_not_found(code))?;

        self.cache_mapping(code, &link.id);

        Ok(link.id)
    }

    /// Preview metadata for `/track?id=<id>`.
    ///
    /// Unknown ids and blank fields fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn track_metadata(&self, id: Option<&str>) -> Result<TrackMetadata, AppError> {
        let link = match id {
            Some(id) => self.repository.find_by_id(id).await?,
            None => None,
        };

        let Some(link) = link else {
            return Ok(TrackMetadata::default());
        };

        let defaults = TrackMetadata::default();

        Ok(TrackMetadata {
            title: non_blank(link.title).unwrap_or(defaults.title),
            description: non_blank(link.description).unwrap_or(defaults.description),
            image_url: non_blank(link.image_url).unwrap_or(defaults.image_url),
        })
    }

    fn cache_mapping(&self, code: &str, link_id: &str) {
        let cache = self.cache.clone();
        let code = code.to_string();
        let link_id = link_id.to_string();

        tokio::spawn(async move {
            if let Err(e) = cache.set_link_id(&code, &link_id, None).await {
                error!("Failed to cache short code {}: {}", code, e);
            }
        });
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn not_found(id: &str) -> AppError {
    AppError::not_found("Share link not found", json!({ "id": id }))
}

fn short_code_not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::repositories::MockShareLinkRepository;
    use crate::infrastructure::cache::NullCache;

    fn test_link(id: &str) -> ShareLink {
        ShareLink::from(NewShareLink::from_draft(
            id.to_string(),
            ShareLinkDraft {
                name: "Promo".to_string(),
                ..Default::default()
            },
            1000,
        ))
    }

    fn service(repo: MockShareLinkRepository) -> ShareLinkService<MockShareLinkRepository> {
        ShareLinkService::new(
            Arc::new(repo),
            Arc::new(NullCache::new()),
            Arc::new(ManualClock::new(5000)),
        )
    }

    #[tokio::test]
    async fn test_create_generates_id_and_url() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo
            .expect_create()
            .withf(|new_link| {
                Uuid::parse_str(&new_link.id).is_ok()
                    && new_link.url == format!("/track?id={}", new_link.id)
                    && new_link.created_at == 5000
            })
            .times(1)
            .returning(|new_link| Ok(ShareLink::from(new_link)));

        let link = service(mock_repo)
            .create(ShareLinkDraft {
                name: "Promo".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(link.name, "Promo");
        assert_eq!(link.created_at, 5000);
        assert_eq!(link.updated_at, 5000);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo.expect_create().times(0);

        let result = service(mock_repo)
            .create(ShareLinkDraft {
                name: "   ".to_string(),
                ..Default::default()
            })
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_generate_short_url_returns_existing() {
        let mut mock_repo = MockShareLinkRepository::new();

        let mut existing = test_link("link-1");
        existing.short_code = Some("abc123".to_string());
        existing.short_url = Some("https://loc.example.com/s/abc123".to_string());

        mock_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_find_by_short_code().times(0);
        mock_repo.expect_assign_short_url().times(0);

        let link = service(mock_repo)
            .generate_short_url("link-1", "https://other.example.com")
            .await
            .unwrap();

        assert_eq!(
            link.short_url.as_deref(),
            Some("https://loc.example.com/s/abc123")
        );
    }

    #[tokio::test]
    async fn test_generate_short_url_builds_url_from_base() {
        let mut mock_repo = MockShareLinkRepository::new();

        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id))));
        mock_repo
            .expect_find_by_short_code()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_assign_short_url()
            .withf(|id, code, short_url, now| {
                id == "link-1"
                    && is_valid_short_code(code)
                    && short_url == format!("https://loc.example.com/s/{}", code)
                    && *now == 5000
            })
            .times(1)
            .returning(|id, code, short_url, now| {
                let mut link = test_link(id);
                link.short_code = Some(code.to_string());
                link.short_url = Some(short_url.to_string());
                link.updated_at = now;
                Ok(Some(link))
            });

        let link = service(mock_repo)
            .generate_short_url("link-1", "https://loc.example.com/")
            .await
            .unwrap();

        assert!(link.has_short_url());
    }

    #[tokio::test]
    async fn test_generate_short_url_retries_on_collision() {
        let mut mock_repo = MockShareLinkRepository::new();

        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id))));

        let mut lookups = 0;
        mock_repo
            .expect_find_by_short_code()
            .times(3)
            .returning(move |_| {
                lookups += 1;
                if lookups < 3 {
                    Ok(Some(test_link("taken")))
                } else {
                    Ok(None)
                }
            });
        mock_repo
            .expect_assign_short_url()
            .times(1)
            .returning(|id, code, short_url, _| {
                let mut link = test_link(id);
                link.short_code = Some(code.to_string());
                link.short_url = Some(short_url.to_string());
                Ok(Some(link))
            });

        let link = service(mock_repo)
            .generate_short_url("link-1", "https://loc.example.com")
            .await
            .unwrap();

        assert!(link.has_short_url());
    }

    #[tokio::test]
    async fn test_generate_short_url_gives_up_after_ten_collisions() {
        let mut mock_repo = MockShareLinkRepository::new();

        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id))));
        mock_repo
            .expect_find_by_short_code()
            .times(10)
            .returning(|_| Ok(Some(test_link("taken"))));
        mock_repo.expect_assign_short_url().times(0);

        let result = service(mock_repo)
            .generate_short_url("link-1", "https://loc.example.com")
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_generate_short_url_missing_link() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(mock_repo)
            .generate_short_url("missing", "https://loc.example.com")
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_short_code_rejects_malformed_without_lookup() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo.expect_find_by_short_code().times(0);

        let result = service(mock_repo).resolve_short_code("NOT-A-CODE").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_short_code_reads_repository_on_miss() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo
            .expect_find_by_short_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some(test_link("link-1"))));

        let link_id = service(mock_repo)
            .resolve_short_code("abc123")
            .await
            .unwrap();

        assert_eq!(link_id, "link-1");
    }

    #[tokio::test]
    async fn test_track_metadata_defaults_for_unknown_link() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));

        let meta = service(mock_repo)
            .track_metadata(Some("missing"))
            .await
            .unwrap();

        assert_eq!(meta, TrackMetadata::default());
        assert_eq!(meta.title, "Live Location");
        assert_eq!(meta.description, "Share your live location.");
    }

    #[tokio::test]
    async fn test_track_metadata_uses_link_fields() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo.expect_find_by_id().returning(|id| {
            let mut link = test_link(id);
            link.title = Some("Find me".to_string());
            link.description = Some(String::new());
            Ok(Some(link))
        });

        let meta = service(mock_repo)
            .track_metadata(Some("link-1"))
            .await
            .unwrap();

        assert_eq!(meta.title, "Find me");
        assert_eq!(meta.description, DEFAULT_TRACK_DESCRIPTION);
        assert_eq!(meta.image_url, DEFAULT_TRACK_IMAGE);
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let mut mock_repo = MockShareLinkRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete().times(0);

        let result = service(mock_repo).delete("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }
}
