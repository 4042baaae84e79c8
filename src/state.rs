//! Shared application state injected into handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::{AuthService, LocationService, ShareLinkService};
use crate::domain::clock::Clock;
use crate::domain::identity::DeviceIdentity;
use crate::domain::repositories::{LocationRepository, ShareLinkRepository, TokenRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::memory::{
    MemoryLocationRepository, MemoryShareLinkRepository, MemoryTokenRepository,
};
use crate::infrastructure::persistence::{
    PgLocationRepository, PgShareLinkRepository, PgTokenRepository,
};

/// The repositories of one storage backend.
#[derive(Clone)]
pub struct Repositories {
    pub locations: Arc<dyn LocationRepository>,
    pub share_links: Arc<dyn ShareLinkRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

impl Repositories {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            locations: Arc::new(PgLocationRepository::new(pool.clone())),
            share_links: Arc::new(PgShareLinkRepository::new(pool.clone())),
            tokens: Arc::new(PgTokenRepository::new(pool)),
        }
    }

    /// Fresh, empty process-local maps.
    pub fn in_memory() -> Self {
        Self {
            locations: Arc::new(MemoryLocationRepository::new()),
            share_links: Arc::new(MemoryShareLinkRepository::new()),
            tokens: Arc::new(MemoryTokenRepository::new()),
        }
    }
}

/// Services and settings shared by every request.
///
/// Repositories are type-erased so the same router serves the PostgreSQL and
/// in-memory backends.
#[derive(Clone)]
pub struct AppState {
    pub location_service: Arc<LocationService<dyn LocationRepository>>,
    pub share_link_service: Arc<ShareLinkService<dyn ShareLinkRepository>>,
    pub auth_service: Arc<AuthService<dyn TokenRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub identity: Arc<dyn DeviceIdentity>,
    /// Origin short URLs are built on, e.g. `https://loc.example.com`.
    pub public_base_url: String,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for the client address.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn DeviceIdentity>,
        token_signing_secret: String,
        public_base_url: String,
        behind_proxy: bool,
    ) -> Self {
        Self {
            location_service: Arc::new(LocationService::new(
                repositories.locations,
                clock.clone(),
            )),
            share_link_service: Arc::new(ShareLinkService::new(
                repositories.share_links,
                cache.clone(),
                clock,
            )),
            auth_service: Arc::new(AuthService::new(repositories.tokens, token_signing_secret)),
            cache,
            identity,
            public_base_url,
            behind_proxy,
        }
    }
}
