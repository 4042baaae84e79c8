//! Handlers for share link management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::location::{LocationResponse, ShareLinkLocationsResponse};
use crate::api::dto::share_link::{
    CreateShareLinkRequest, ShareLinkListResponse, ShareLinkResponse, UpdateShareLinkRequest,
};
use crate::error::AppError;
use crate::state::AppState;

/// Lists share links, newest first.
///
/// # Endpoint
///
/// `GET /api/share-links`
pub async fn list_share_links_handler(
    State(state): State<AppState>,
) -> Result<Json<ShareLinkListResponse>, AppError> {
    let links = state.share_link_service.list().await?;

    Ok(Json(ShareLinkListResponse {
        total: links.len(),
        items: links.into_iter().map(ShareLinkResponse::from).collect(),
    }))
}

/// Creates a share link.
///
/// # Endpoint
///
/// `POST /api/share-links`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Weekend trip",
///   "title": "Where are you?",            // optional, preview title
///   "description": "Tap to share",        // optional
///   "image_url": "https://.../pin.png",   // optional
///   "expiration_date": "2030-01-31"       // optional
/// }
/// ```
///
/// Returns 201 Created with the link, whose `url` is `/track?id=<id>`.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn create_share_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateShareLinkRequest>,
) -> Result<(StatusCode, Json<ShareLinkResponse>), AppError> {
    payload.validate()?;

    let link = state.share_link_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// `GET /api/share-links/{id}`
pub async fn get_share_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShareLinkResponse>, AppError> {
    let link = state.share_link_service.get(&id).await?;

    Ok(Json(link.into()))
}

/// Partially updates a share link.
///
/// # Endpoint
///
/// `PATCH /api/share-links/{id}`
///
/// The tracking URL and any issued short URL are kept.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
/// Returns 400 Bad Request if validation fails.
pub async fn update_share_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateShareLinkRequest>,
) -> Result<Json<ShareLinkResponse>, AppError> {
    payload.validate()?;

    let link = state.share_link_service.update(&id, payload.into()).await?;

    Ok(Json(link.into()))
}

/// Deletes a share link.
///
/// # Endpoint
///
/// `DELETE /api/share-links/{id}`
///
/// Its short code stops resolving immediately. Locations recorded against the
/// link are kept.
pub async fn delete_share_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.share_link_service.delete(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Issues a short URL for a share link.
///
/// # Endpoint
///
/// `POST /api/share-links/{id}/short-url`
///
/// Idempotent: a link that already has a short URL returns it unchanged.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
pub async fn short_url_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShareLinkResponse>, AppError> {
    let link = state
        .share_link_service
        .generate_short_url(&id, &state.public_base_url)
        .await?;

    Ok(Json(link.into()))
}

/// Lists locations recorded through one share link.
///
/// # Endpoint
///
/// `GET /api/share-links/{id}/locations`
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
pub async fn share_link_locations_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShareLinkLocationsResponse>, AppError> {
    let link = state.share_link_service.get(&id).await?;

    let locations = state.location_service.list_by_share_link(&link.id).await?;
    let now = state.location_service.now();

    Ok(Json(ShareLinkLocationsResponse {
        share_link_id: link.id,
        total: locations.len(),
        items: locations
            .into_iter()
            .map(|location| LocationResponse::from_location(location, now))
            .collect(),
    }))
}
