//! Handlers for tracked location administration.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::location::{LocationListResponse, LocationResponse, UpdateLocationRequest};
use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::error::AppError;
use crate::state::AppState;

/// Lists tracked locations, most recently updated first.
///
/// # Endpoint
///
/// `GET /api/locations?page=1&page_size=10`
///
/// # Errors
///
/// Returns 400 Bad Request for invalid pagination parameters.
pub async fn list_locations_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LocationListResponse>, AppError> {
    let (page, page_size) = params
        .validate()
        .map_err(|msg| AppError::bad_request(msg, json!({})))?;

    let result = state
        .location_service
        .list(i64::from(page), i64::from(page_size))
        .await?;

    let now = state.location_service.now();

    Ok(Json(LocationListResponse {
        pagination: PaginationMeta::new(page, page_size, result.total),
        items: result
            .items
            .into_iter()
            .map(|location| LocationResponse::from_location(location, now))
            .collect(),
    }))
}

/// `GET /api/locations/{device_id}`
///
/// Returns 404 Not Found if the device has no record.
pub async fn get_location_handler(
    Path(device_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LocationResponse>, AppError> {
    let location = state.location_service.get(&device_id).await?;

    Ok(Json(LocationResponse::from_location(
        location,
        state.location_service.now(),
    )))
}

/// Partially updates a tracked location.
///
/// # Endpoint
///
/// `PATCH /api/locations/{device_id}`
///
/// # Request Body
///
/// ```json
/// { "nickname": "Alice", "latitude": 48.85, "longitude": 2.35, "ip": "203.0.113.7" }
/// ```
///
/// `created_at` cannot be changed; `updated_at` is set to now.
///
/// # Errors
///
/// Returns 404 Not Found if the device has no record.
/// Returns 400 Bad Request if validation fails.
pub async fn update_location_handler(
    Path(device_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<LocationResponse>, AppError> {
    payload.validate()?;

    let location = state
        .location_service
        .update(&device_id, payload.into())
        .await?;

    Ok(Json(LocationResponse::from_location(
        location,
        state.location_service.now(),
    )))
}

/// Deletes a tracked location.
///
/// # Endpoint
///
/// `DELETE /api/locations/{device_id}`
///
/// The device's next fix creates a fresh record.
///
/// # Errors
///
/// Returns 404 Not Found if the device has no record.
pub async fn delete_location_handler(
    Path(device_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.location_service.delete(&device_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
