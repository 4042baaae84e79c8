//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short code to share link id mappings.
///
/// Cache failures must degrade to repository lookups and never fail a
/// redirect.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up the share link id a short code points at.
    ///
    /// Returns `Ok(None)` on a miss. Backend errors are logged and reported as
    /// misses.
    async fn get_link_id(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping with an optional TTL (implementation default if `None`).
    ///
    /// Errors are logged, not propagated.
    async fn set_link_id(
        &self,
        short_code: &str,
        link_id: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a mapping. Used when a share link is edited or deleted.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Reports whether the backend answers.
    async fn health_check(&self) -> bool;
}
