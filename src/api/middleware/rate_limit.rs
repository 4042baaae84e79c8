//! Rate limiting middleware using token bucket algorithm.
//!
//! Limits are keyed per client IP. Directly exposed deployments key on the
//! socket peer address; behind a trusted proxy the address comes from
//! `X-Forwarded-For` / `X-Real-IP` (see [`apply`]).

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// A governor layer keyed by `K`.
pub type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub per_second: u64,
    pub burst_size: u32,
}

/// Limits for public endpoints such as `POST /track/fix`.
///
/// A tracking page sends a fix every few seconds, so the bucket refills at
/// 2 requests per second with a burst of 100.
pub const PUBLIC: Limits = Limits {
    per_second: 2,
    burst_size: 100,
};

/// Stricter limits for authenticated admin endpoints.
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
pub const SECURE: Limits = Limits {
    per_second: 1,
    burst_size: 10,
};

/// Creates a rate limiter with `limits`, keyed by `key_extractor`.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer<K: KeyExtractor>(key_extractor: K, limits: Limits) -> RateLimitLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(limits.per_second)
            .burst_size(limits.burst_size)
            .finish()
            .expect("rate limits are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Wraps every route of `router` in a rate limiter with `limits`.
///
/// # Key Extraction
///
/// - `behind_proxy = false`: socket peer address ([`PeerIpKeyExtractor`]).
///   The server must be started with connect info.
/// - `behind_proxy = true`: `X-Forwarded-For`, `X-Real-IP`, `Forwarded`, then
///   the peer address ([`SmartIpKeyExtractor`]).
///
/// # Example
///
/// ```rust,ignore
/// let public = rate_limit::apply(
///     Router::new().route("/track/fix", post(track_fix_handler)),
///     rate_limit::PUBLIC,
///     config.behind_proxy,
/// );
/// ```
pub fn apply<S>(router: Router<S>, limits: Limits, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(layer(SmartIpKeyExtractor, limits))
    } else {
        router.layer(layer(PeerIpKeyExtractor, limits))
    }
}
