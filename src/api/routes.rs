//! API route configuration.
//!
//! [`protected_routes`] require Bearer token authentication via
//! [`crate::api::middleware::auth`]; [`tracking_routes`] are public and serve
//! the tracking page.

use crate::api::handlers::{
    create_share_link_handler, delete_location_handler, delete_share_link_handler,
    get_location_handler, get_share_link_handler, list_locations_handler,
    list_share_links_handler, share_link_locations_handler, short_url_handler, track_fix_handler,
    track_meta_handler, update_location_handler, update_share_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Admin routes, to be protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /locations`                   - Tracked locations (paginated)
/// - `GET    /locations/{device_id}`       - One tracked location
/// - `PATCH  /locations/{device_id}`       - Edit nickname, IP or coordinates
/// - `DELETE /locations/{device_id}`       - Delete a tracked location
/// - `GET    /share-links`                 - List share links
/// - `POST   /share-links`                 - Create a share link
/// - `GET    /share-links/{id}`            - One share link
/// - `PATCH  /share-links/{id}`            - Edit a share link
/// - `DELETE /share-links/{id}`            - Delete a share link
/// - `POST   /share-links/{id}/short-url`  - Issue (or return) the short URL
/// - `GET    /share-links/{id}/locations`  - Locations captured through a link
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/locations", get(list_locations_handler))
        .route(
            "/locations/{device_id}",
            get(get_location_handler)
                .patch(update_location_handler)
                .delete(delete_location_handler),
        )
        .route(
            "/share-links",
            get(list_share_links_handler).post(create_share_link_handler),
        )
        .route(
            "/share-links/{id}",
            get(get_share_link_handler)
                .patch(update_share_link_handler)
                .delete(delete_share_link_handler),
        )
        .route("/share-links/{id}/short-url", post(short_url_handler))
        .route(
            "/share-links/{id}/locations",
            get(share_link_locations_handler),
        )
}

/// Public tracking page routes.
///
/// # Endpoints
///
/// - `POST /fix`  - Reconcile one position fix
/// - `GET  /meta` - Link preview metadata for `/track?id=`
pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/fix", post(track_fix_handler))
        .route("/meta", get(track_meta_handler))
}
