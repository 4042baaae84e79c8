//! DTOs for admin location endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::domain::entities::{LocationPatch, TrackedLocation};
use crate::utils::time_ago::time_ago;

/// A tracked location as returned to administrators.
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub device_id: String,
    pub share_link_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub ip: Option<String>,
    pub device_type: Option<String>,
    pub user_agent: Option<String>,
    pub screen_width: Option<i32>,
    pub screen_height: Option<i32>,
    pub referrer: Option<String>,
    pub user_language: Option<String>,
    pub user_timezone: Option<String>,
    pub nickname: String,
    pub created_at: Option<i64>,
    pub updated_at: i64,
    /// e.g. `"5 minutes ago"`.
    pub updated_ago: String,
}

impl LocationResponse {
    pub fn from_location(location: TrackedLocation, now: i64) -> Self {
        Self {
            updated_ago: time_ago(location.updated_at, now),
            device_id: location.device_id,
            share_link_id: location.share_link_id,
            latitude: location.latitude,
            longitude: location.longitude,
            ip: location.ip,
            device_type: location.device_type,
            user_agent: location.user_agent,
            screen_width: location.screen_width,
            screen_height: location.screen_height,
            referrer: location.referrer,
            user_language: location.user_language,
            user_timezone: location.user_timezone,
            nickname: location.nickname,
            created_at: location.created_at,
            updated_at: location.updated_at,
        }
    }
}

/// Paginated list of tracked locations.
#[derive(Debug, Serialize)]
pub struct LocationListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LocationResponse>,
}

/// Request body for `PATCH /api/locations/{device_id}`.
///
/// All fields are optional; only provided fields are changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 64, message = "Invalid IP"))]
    pub ip: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,

    #[validate(length(max = 100, message = "Nickname must be at most 100 characters"))]
    pub nickname: Option<String>,
}

impl From<UpdateLocationRequest> for LocationPatch {
    fn from(req: UpdateLocationRequest) -> Self {
        Self {
            ip: req.ip,
            latitude: req.latitude,
            longitude: req.longitude,
            nickname: req.nickname,
        }
    }
}

/// Locations recorded against one share link.
#[derive(Debug, Serialize)]
pub struct ShareLinkLocationsResponse {
    pub share_link_id: String,
    pub total: usize,
    pub items: Vec<LocationResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_validation() {
        let ok: UpdateLocationRequest =
            serde_json::from_str(r#"{"nickname": "Alice", "latitude": 45.5}"#).unwrap();
        assert!(ok.validate().is_ok());

        let bad: UpdateLocationRequest =
            serde_json::from_str(r#"{"longitude": 181.0}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_patch_keeps_absent_fields_unset() {
        let req: UpdateLocationRequest =
            serde_json::from_str(r#"{"nickname": "Bob"}"#).unwrap();
        let patch = LocationPatch::from(req);

        assert_eq!(patch.nickname.as_deref(), Some("Bob"));
        assert!(patch.latitude.is_none());
        assert!(patch.ip.is_none());
    }
}
