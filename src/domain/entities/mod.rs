//! Core domain entities.
//!
//! Entities are plain data structures plus the small merge rules that keep
//! their invariants. Creation inputs live in separate structs:
//!
//! - [`TrackedLocation`] - One record per device, reconciled from fixes
//!   ([`LocationWrite`]) and edited by administrators ([`LocationPatch`])
//! - [`ShareLink`] - Drafted as [`ShareLinkDraft`], stored from [`NewShareLink`],
//!   edited with [`ShareLinkPatch`]

pub mod location;
pub mod share_link;

pub use location::{
    DeviceMetadata, LocationPatch, LocationWrite, PositionSample, TrackedLocation, UpsertOutcome,
    Upserted,
};
pub use share_link::{NewShareLink, ShareLink, ShareLinkDraft, ShareLinkPatch};
