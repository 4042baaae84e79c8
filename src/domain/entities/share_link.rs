//! Share link entity.

/// An administrator-created link whose tracking URL records visits against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// `YYYY-MM-DD`, informational only.
    pub expiration_date: Option<String>,
    /// Tracking page path, `/track?id=<id>`.
    pub url: String,
    pub short_code: Option<String>,
    pub short_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ShareLink {
    /// Tracking page path for a share link id.
    pub fn tracking_path(id: &str) -> String {
        format!("/track?id={}", id)
    }

    /// Returns true once a short URL has been issued.
    pub fn has_short_url(&self) -> bool {
        self.short_url.is_some()
    }
}

/// Administrator-supplied fields of a share link about to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareLinkDraft {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub expiration_date: Option<String>,
}

/// Input data for creating a new share link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShareLink {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub expiration_date: Option<String>,
    pub url: String,
    pub created_at: i64,
}

/// Partial update for an existing share link. `None` fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareLinkPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub expiration_date: Option<String>,
}

impl ShareLink {
    /// Applies a patch in place, bumping `updated_at`.
    pub fn apply_patch(&mut self, patch: &ShareLinkPatch, now: i64) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = Some(image_url.clone());
        }
        if let Some(expiration_date) = &patch.expiration_date {
            self.expiration_date = Some(expiration_date.clone());
        }
        self.updated_at = self.updated_at.max(now);
    }
}

impl NewShareLink {
    /// Completes a draft with its generated id, tracking path and creation time.
    pub fn from_draft(id: String, draft: ShareLinkDraft, created_at: i64) -> Self {
        Self {
            url: ShareLink::tracking_path(&id),
            id,
            name: draft.name,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            expiration_date: draft.expiration_date,
            created_at,
        }
    }
}

impl From<NewShareLink> for ShareLink {
    fn from(new_link: NewShareLink) -> Self {
        Self {
            id: new_link.id,
            name: new_link.name,
            title: new_link.title,
            description: new_link.description,
            image_url: new_link.image_url,
            expiration_date: new_link.expiration_date,
            url: new_link.url,
            short_code: None,
            short_url: None,
            created_at: new_link.created_at,
            updated_at: new_link.created_at,
        }
    }
}
