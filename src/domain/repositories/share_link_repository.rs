//! Repository trait for share link data access.

use crate::domain::entities::{NewShareLink, ShareLink, ShareLinkPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for share links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShareLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryShareLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareLinkRepository: Send + Sync {
    /// Stores a new share link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the id already exists.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_link: NewShareLink) -> Result<ShareLink, AppError>;

    /// Finds a share link by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: &str) -> Result<Option<ShareLink>, AppError>;

    /// Finds the share link a short code was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_short_code(&self, code: &str) -> Result<Option<ShareLink>, AppError>;

    /// Lists all share links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self) -> Result<Vec<ShareLink>, AppError>;

    /// Partially updates a share link. Returns `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update(
        &self,
        id: &str,
        patch: ShareLinkPatch,
        now: i64,
    ) -> Result<Option<ShareLink>, AppError>;

    /// Deletes a share link. Returns `Ok(false)` if it did not exist.
    ///
    /// Tracked locations referencing the link are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Attaches a short code and URL to a link that has none yet.
    ///
    /// Returns `Ok(None)` when the link does not exist or already carries a
    /// short URL; nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn assign_short_url(
        &self,
        id: &str,
        code: &str,
        short_url: &str,
        now: i64,
    ) -> Result<Option<ShareLink>, AppError>;
}
