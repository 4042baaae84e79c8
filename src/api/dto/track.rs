//! DTOs for the public tracking endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for `POST /track/fix`.
///
/// Only the coordinates are required. Metadata the browser could not gather
/// is omitted and falls back to request headers where possible.
#[derive(Debug, Deserialize, Validate)]
pub struct FixRequest {
    /// Device id cached by the browser; absent on the first visit.
    pub device_id: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Invalid share link id"))]
    pub share_link_id: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    #[validate(range(min = 0, max = 100000))]
    pub screen_width: Option<i32>,

    #[validate(range(min = 0, max = 100000))]
    pub screen_height: Option<i32>,

    #[validate(length(max = 64))]
    pub user_language: Option<String>,

    #[validate(length(max = 64))]
    pub user_timezone: Option<String>,

    #[validate(length(max = 2048))]
    pub referrer: Option<String>,
}

/// Response for `POST /track/fix`.
#[derive(Debug, Serialize)]
pub struct FixResponse {
    /// Id the browser should cache and send with later fixes.
    pub device_id: String,
    /// `"inserted"` for a first fix, `"merged"` afterwards.
    pub outcome: &'static str,
    /// Text the tracking view shows, e.g. `Latitude: 10.000000, Longitude: 20.000000`.
    pub status: String,
    pub created_at: Option<i64>,
    pub updated_at: i64,
}

/// Query for `GET /track/meta`.
#[derive(Debug, Deserialize)]
pub struct TrackMetaQuery {
    pub id: Option<String>,
}

/// Link preview metadata for a tracking page.
#[derive(Debug, Serialize)]
pub struct TrackMetaResponse {
    pub title: String,
    pub description: String,
    pub image: String,
}
