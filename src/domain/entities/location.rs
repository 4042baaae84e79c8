//! Tracked location entity and the fix-merge rules behind the upsert.

use serde_json::json;

use crate::error::AppError;

/// A single geolocation fix reported by a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] naming the offending coordinate.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::bad_request(
                "Latitude must be between -90 and 90",
                json!({ "latitude": self.latitude.to_string() }),
            ));
        }

        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::bad_request(
                "Longitude must be between -180 and 180",
                json!({ "longitude": self.longitude.to_string() }),
            ));
        }

        Ok(())
    }
}

/// Descriptive snapshot captured alongside every fix.
///
/// Every field is optional: a failed lookup degrades to `None` and never
/// blocks the location write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceMetadata {
    pub share_link_id: Option<String>,
    pub ip: Option<String>,
    pub device_type: Option<String>,
    pub user_agent: Option<String>,
    pub screen_width: Option<i32>,
    pub screen_height: Option<i32>,
    pub referrer: Option<String>,
    pub user_language: Option<String>,
    pub user_timezone: Option<String>,
}

/// Everything the store needs to reconcile one fix.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationWrite {
    pub device_id: String,
    pub sample: PositionSample,
    pub metadata: DeviceMetadata,
    /// Write timestamp, epoch millis.
    pub now: i64,
}

/// The stored record for one device.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedLocation {
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
    /// First-seen time. `None` only for rows left behind by a corrupt write.
    pub created_at: Option<i64>,
    pub updated_at: i64,
}

impl TrackedLocation {
    /// Builds the record for a device seen for the first time.
    pub fn first_seen(write: &LocationWrite) -> Self {
        let m = &write.metadata;
        Self {
            device_id: write.device_id.clone(),
            share_link_id: m.share_link_id.clone(),
            latitude: write.sample.latitude,
            longitude: write.sample.longitude,
            ip: m.ip.clone(),
            device_type: m.device_type.clone(),
            user_agent: m.user_agent.clone(),
            screen_width: m.screen_width,
            screen_height: m.screen_height,
            referrer: m.referrer.clone(),
            user_language: m.user_language.clone(),
            user_timezone: m.user_timezone.clone(),
            nickname: String::new(),
            created_at: Some(write.now),
            updated_at: write.now,
        }
    }

    /// Folds a fix into an existing record.
    ///
    /// Position and metadata are overwritten. `created_at` is kept, or healed
    /// to `write.now` when missing. `updated_at` never moves backwards.
    /// `share_link_id` only changes when the fix carries one, and `nickname`
    /// is left alone.
    pub fn merge(&mut self, write: &LocationWrite) {
        let m = &write.metadata;

        if m.share_link_id.is_some() {
            self.share_link_id = m.share_link_id.clone();
        }
        self.latitude = write.sample.latitude;
        self.longitude = write.sample.longitude;
        self.ip = m.ip.clone();
        self.device_type = m.device_type.clone();
        self.user_agent = m.user_agent.clone();
        self.screen_width = m.screen_width;
        self.screen_height = m.screen_height;
        self.referrer = m.referrer.clone();
        self.user_language = m.user_language.clone();
        self.user_timezone = m.user_timezone.clone();

        self.created_at = Some(self.created_at.unwrap_or(write.now));
        self.updated_at = self.updated_at.max(write.now);
    }

    /// Applies an administrator edit.
    pub fn apply_patch(&mut self, patch: &LocationPatch, now: i64) {
        if let Some(ip) = &patch.ip {
            self.ip = Some(ip.clone());
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        if let Some(nickname) = &patch.nickname {
            self.nickname = nickname.clone();
        }
        self.updated_at = self.updated_at.max(now);
    }
}

/// Whether an upsert created the record or merged into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Merged => "merged",
        }
    }
}

/// Result of reconciling one fix.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub location: TrackedLocation,
    pub outcome: UpsertOutcome,
}

/// Administrator edit of a tracked location. `None` fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub ip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nickname: Option<String>,
}
