//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries against the schema in `migrations/`.
//!
//! # Repositories
//!
//! - [`PgLocationRepository`] - Tracked locations and the `ON CONFLICT` upsert
//! - [`PgShareLinkRepository`] - Share links and short code assignment
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_location_repository;
pub mod pg_share_link_repository;
pub mod pg_token_repository;

pub use pg_location_repository::PgLocationRepository;
pub use pg_share_link_repository::PgShareLinkRepository;
pub use pg_token_repository::PgTokenRepository;
