//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Tracked locations and share links
//! - [`repositories`] - Data access trait definitions
//! - [`position_event`] - Position watch events and the displayed track status
//! - [`clock`] - Injected time source
//! - [`identity`] - Device id provisioning
//!
//! The domain layer has no dependencies on infrastructure or presentation.
//! Orchestration lives in [`crate::application`].

pub mod clock;
pub mod entities;
pub mod identity;
pub mod position_event;
pub mod repositories;
