//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::domain::entities::ShareLink;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to the tracking page of its share link.
///
/// # Endpoint
///
/// `GET /s/{code}`
///
/// # Request Flow
///
/// 1. Check cache for the share link id (cache key: the code)
/// 2. On cache miss, query storage and cache the mapping in the background
/// 3. Return 307 Temporary Redirect to `/track?id=<share_link_id>`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let link_id = state.share_link_service.resolve_short_code(&code).await?;

    Ok(Redirect::temporary(&ShareLink::tracking_path(&link_id)))
}
