//! Handlers for the public tracking page endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
};
use validator::Validate;

use crate::api::dto::track::{FixRequest, FixResponse, TrackMetaQuery, TrackMetaResponse};
use crate::domain::entities::{DeviceMetadata, PositionSample};
use crate::domain::position_event::TrackStatus;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientIp;
use crate::utils::user_agent::device_type;

/// Reconciles one position fix into the device's tracked location.
///
/// # Endpoint
///
/// `POST /track/fix`
///
/// # Request Body
///
/// ```json
/// {
///   "device_id": "0b8f3c2e-...",   // optional, cached by the browser
///   "share_link_id": "5f1d...",    // optional, from /track?id=
///   "latitude": 10.0,
///   "longitude": 20.0,
///   "screen_width": 390,           // optional
///   "user_timezone": "Europe/Paris" // optional
/// }
/// ```
///
/// Metadata missing from the body is taken from `User-Agent`, `Referer` and
/// `Accept-Language`; anything still unknown is stored as null.
///
/// # Errors
///
/// Returns 400 Bad Request for out-of-range coordinates.
/// Returns 500 Internal Server Error if the write fails; the stored record is
/// left as it was.
pub async fn track_fix_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Json(payload): Json<FixRequest>,
) -> Result<Json<FixResponse>, AppError> {
    payload.validate()?;

    let device_id = state.identity.provision(payload.device_id.as_deref());
    let sample = PositionSample::new(payload.latitude, payload.longitude);

    let user_agent = header_value(&headers, header::USER_AGENT);

    let metadata = DeviceMetadata {
        share_link_id: payload.share_link_id,
        ip: ip.map(|ip| ip.to_string()),
        device_type: user_agent.as_deref().map(|ua| device_type(ua).to_string()),
        user_agent,
        screen_width: payload.screen_width,
        screen_height: payload.screen_height,
        referrer: payload
            .referrer
            .or_else(|| header_value(&headers, header::REFERER)),
        user_language: payload
            .user_language
            .or_else(|| preferred_language(&headers)),
        user_timezone: payload.user_timezone,
    };

    let upserted = state
        .location_service
        .upsert(&device_id, sample, metadata)
        .await?;

    Ok(Json(FixResponse {
        device_id,
        outcome: upserted.outcome.as_str(),
        status: TrackStatus::located(&sample).to_string(),
        created_at: upserted.location.created_at,
        updated_at: upserted.location.updated_at,
    }))
}

/// Returns link preview metadata for `/track?id=<id>`.
///
/// # Endpoint
///
/// `GET /track/meta?id=<share_link_id>`
///
/// Unknown or missing ids get the default title, description and image.
pub async fn track_meta_handler(
    State(state): State<AppState>,
    Query(query): Query<TrackMetaQuery>,
) -> Result<Json<TrackMetaResponse>, AppError> {
    let meta = state
        .share_link_service
        .track_metadata(query.id.as_deref())
        .await?;

    Ok(Json(TrackMetaResponse {
        title: meta.title,
        description: meta.description,
        image: meta.image_url,
    }))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First tag of `Accept-Language`, e.g. `en-US` from `en-US,en;q=0.9`.
fn preferred_language(headers: &HeaderMap) -> Option<String> {
    let value = header_value(headers, header::ACCEPT_LANGUAGE)?;
    let tag = value.split(',').next()?.split(';').next()?.trim();

    (!tag.is_empty() && tag != "*").then(|| tag.to_string())
}
