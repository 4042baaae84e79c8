//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::location_service::LocationService`] - Fix reconciliation and location admin
//! - [`services::share_link_service::ShareLinkService`] - Share links and short URLs
//! - [`services::auth_service::AuthService`] - API token authentication
//! - [`tracking`] - Continuous position watch driver

pub mod services;
pub mod tracking;
