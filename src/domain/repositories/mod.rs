//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL) and
//! `crate::infrastructure::memory` (in-process). Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LocationRepository`] - Tracked locations and the atomic fix upsert
//! - [`ShareLinkRepository`] - Share links and short URL assignment
//! - [`TokenRepository`] - API token authentication

pub mod location_repository;
pub mod share_link_repository;
pub mod token_repository;

pub use location_repository::LocationRepository;
pub use share_link_repository::ShareLinkRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use location_repository::MockLocationRepository;
#[cfg(test)]
pub use share_link_repository::MockShareLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
