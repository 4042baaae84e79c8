//! In-process repository implementations.
//!
//! Backed by `DashMap`, selected with `STORAGE_BACKEND=memory`. Data lives as
//! long as the process. Used for local development and integration tests.
//!
//! # Repositories
//!
//! - [`MemoryLocationRepository`] - Tracked locations, atomic per-device merge
//! - [`MemoryShareLinkRepository`] - Share links and short code index
//! - [`MemoryTokenRepository`] - API tokens

mod location;
mod share_link;
mod token;

pub use location::MemoryLocationRepository;
pub use share_link::MemoryShareLinkRepository;
pub use token::MemoryTokenRepository;
