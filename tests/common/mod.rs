#![allow(dead_code)]

use axum::routing::get;
use axum::{Router, middleware};
use axum_test::TestServer;
use location_share::api::handlers::{health_handler, redirect_handler};
use location_share::api::middleware::auth;
use location_share::api::routes::{protected_routes, tracking_routes};
use location_share::domain::clock::ManualClock;
use location_share::domain::identity::{DeviceIdentity, RandomDeviceIdentity};
use location_share::infrastructure::cache::NullCache;
use location_share::state::{AppState, Repositories};
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "https://loc.example.com";

/// A memory-backed application whose clock the test drives.
pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with(Repositories::in_memory(), Arc::new(RandomDeviceIdentity)).await
    }

    pub async fn with(repositories: Repositories, identity: Arc<dyn DeviceIdentity>) -> Self {
        let clock = Arc::new(ManualClock::new(0));

        let state = AppState::new(
            repositories,
            Arc::new(NullCache::new()),
            clock.clone(),
            identity,
            SIGNING_SECRET.to_string(),
            BASE_URL.to_string(),
            false,
        );

        state
            .auth_service
            .ensure_token("test", ADMIN_TOKEN)
            .await
            .unwrap();

        Self { state, clock }
    }

    /// Every route of the service, without rate limiting.
    pub fn server(&self) -> TestServer {
        let api = protected_routes().route_layer(middleware::from_fn_with_state(
            self.state.clone(),
            auth::layer,
        ));

        let app = Router::new()
            .route("/s/{code}", get(redirect_handler))
            .route("/health", get(health_handler))
            .nest("/track", tracking_routes())
            .nest("/api", api)
            .with_state(self.state.clone());

        TestServer::new(app).unwrap()
    }

    pub fn set_time(&self, millis: i64) {
        self.clock.set(millis);
    }
}
