//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /s/{code}`    - Short link redirect to the tracking page (public)
//! - `GET  /health`      - Health check: storage and cache (public)
//! - `/track/*`          - Tracking page endpoints (public, rate limited)
//! - `/api/*`            - Admin REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// When `state.behind_proxy` is `true`, rate limiting reads the client IP
/// from `X-Forwarded-For` / `X-Real-IP` instead of the peer socket address.
/// The router must be served with connect info either way.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let behind_proxy = state.behind_proxy;

    let api_router = rate_limit::apply(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
        rate_limit::SECURE,
        behind_proxy,
    );

    let tracking_router = rate_limit::apply(
        api::routes::tracking_routes(),
        rate_limit::PUBLIC,
        behind_proxy,
    );

    let router = Router::new()
        .route("/s/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/track", tracking_router)
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
