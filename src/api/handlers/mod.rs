//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod locations;
pub mod redirect;
pub mod share_links;
pub mod track;

pub use health::health_handler;
pub use locations::{
    delete_location_handler, get_location_handler, list_locations_handler,
    update_location_handler,
};
pub use redirect::redirect_handler;
pub use share_links::{
    create_share_link_handler, delete_share_link_handler, get_share_link_handler,
    list_share_links_handler, share_link_locations_handler, short_url_handler,
    update_share_link_handler,
};
pub use track::{track_fix_handler, track_meta_handler};
