//! Business logic services for the application layer.

pub mod auth_service;
pub mod location_service;
pub mod share_link_service;

pub use auth_service::AuthService;
pub use location_service::{LocationPage, LocationService};
pub use share_link_service::{ShareLinkService, TrackMetadata};
