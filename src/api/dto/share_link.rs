//! DTOs for share link endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{ShareLink, ShareLinkDraft, ShareLinkPatch};

/// Request body for `POST /api/share-links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShareLinkRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,

    #[validate(custom(function = "crate::api::dto::share_link::validate_date"))]
    pub expiration_date: Option<String>,
}

impl From<CreateShareLinkRequest> for ShareLinkDraft {
    fn from(req: CreateShareLinkRequest) -> Self {
        Self {
            name: req.name,
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            expiration_date: req.expiration_date,
        }
    }
}

/// Request body for `PATCH /api/share-links/{id}`.
///
/// All fields are optional; only provided fields are changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateShareLinkRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,

    #[validate(custom(function = "crate::api::dto::share_link::validate_date"))]
    pub expiration_date: Option<String>,
}

impl From<UpdateShareLinkRequest> for ShareLinkPatch {
    fn from(req: UpdateShareLinkRequest) -> Self {
        Self {
            name: req.name,
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            expiration_date: req.expiration_date,
        }
    }
}

/// Expiration dates are calendar days, `YYYY-MM-DD`.
pub fn validate_date(value: &str) -> Result<(), validator::ValidationError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            validator::ValidationError::new("date")
                .with_message("Expected a YYYY-MM-DD date".into())
        })
}

/// JSON representation of a share link.
#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub expiration_date: Option<String>,
    pub url: String,
    pub short_code: Option<String>,
    pub short_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ShareLink> for ShareLinkResponse {
    fn from(link: ShareLink) -> Self {
        Self {
            id: link.id,
            name: link.name,
            title: link.title,
            description: link.description,
            image_url: link.image_url,
            expiration_date: link.expiration_date,
            url: link.url,
            short_code: link.short_code,
            short_url: link.short_url,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// List of share links.
#[derive(Debug, Serialize)]
pub struct ShareLinkListResponse {
    pub total: usize,
    pub items: Vec<ShareLinkResponse>,
}
