//! PostgreSQL implementation of location repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    LocationPatch, LocationWrite, TrackedLocation, UpsertOutcome, Upserted,
};
use crate::domain::repositories::LocationRepository;
use crate::error::AppError;

/// PostgreSQL repository for tracked locations.
///
/// The fix upsert is a single `INSERT ... ON CONFLICT DO UPDATE`, so the
/// first-seen timestamp is decided by the database row lock rather than a
/// read followed by a write.
pub struct PgLocationRepository {
    pool: Arc<PgPool>,
}

impl PgLocationRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const LOCATION_COLUMNS: &str = "device_id, share_link_id, latitude, longitude, ip, device_type, \
     user_agent, screen_width, screen_height, referrer, user_language, user_timezone, nickname, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LocationRow {
    device_id: String,
    share_link_id: Option<String>,
    latitude: f64,
    longitude: f64,
    ip: Option<String>,
    device_type: Option<String>,
    user_agent: Option<String>,
    screen_width: Option<i32>,
    screen_height: Option<i32>,
    referrer: Option<String>,
    user_language: Option<String>,
    user_timezone: Option<String>,
    nickname: String,
    created_at: Option<i64>,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    location: LocationRow,
    inserted: bool,
}

impl From<LocationRow> for TrackedLocation {
    fn from(row: LocationRow) -> Self {
        Self {
            device_id: row.device_id,
            share_link_id: row.share_link_id,
            latitude: row.latitude,
            longitude: row.longitude,
            ip: row.ip,
            device_type: row.device_type,
            user_agent: row.user_agent,
            screen_width: row.screen_width,
            screen_height: row.screen_height,
            referrer: row.referrer,
            user_language: row.user_language,
            user_timezone: row.user_timezone,
            nickname: row.nickname,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn upsert(&self, write: LocationWrite) -> Result<Upserted, AppError> {
        // xmax is 0 only for a row version created by this INSERT.
        let sql = format!(
            r#"
            INSERT INTO locations (
                device_id, share_link_id, latitude, longitude, ip, device_type, user_agent,
                screen_width, screen_height, referrer, user_language, user_timezone,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            ON CONFLICT (device_id) DO UPDATE SET
                share_link_id = COALESCE(EXCLUDED.share_link_id, locations.share_link_id),
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                ip = EXCLUDED.ip,
                device_type = EXCLUDED.device_type,
                user_agent = EXCLUDED.user_agent,
                screen_width = EXCLUDED.screen_width,
                screen_height = EXCLUDED.screen_height,
                referrer = EXCLUDED.referrer,
                user_language = EXCLUDED.user_language,
                user_timezone = EXCLUDED.user_timezone,
                created_at = COALESCE(locations.created_at, EXCLUDED.created_at),
                updated_at = GREATEST(locations.updated_at, EXCLUDED.updated_at)
            RETURNING {LOCATION_COLUMNS}, (xmax = 0) AS inserted
            "#
        );

        let m = write.metadata;
        let row = sqlx::query_as::<_, UpsertRow>(&sql)
            .bind(&write.device_id)
            .bind(m.share_link_id)
            .bind(write.sample.latitude)
            .bind(write.sample.longitude)
            .bind(m.ip)
            .bind(m.device_type)
            .bind(m.user_agent)
            .bind(m.screen_width)
            .bind(m.screen_height)
            .bind(m.referrer)
            .bind(m.user_language)
            .bind(m.user_timezone)
            .bind(write.now)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(Upserted {
            location: row.location.into(),
            outcome: if row.inserted {
                UpsertOutcome::Inserted
            } else {
                UpsertOutcome::Merged
            },
        })
    }

    async fn find_by_device(&self, device_id: &str) -> Result<Option<TrackedLocation>, AppError> {
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE device_id = $1");

        let row = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(device_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(TrackedLocation::from))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<TrackedLocation>, AppError> {
        let sql = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations \
             ORDER BY updated_at DESC, device_id LIMIT $1 OFFSET $2"
        );

        let rows = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(TrackedLocation::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn list_by_share_link(
        &self,
        share_link_id: &str,
    ) -> Result<Vec<TrackedLocation>, AppError> {
        let sql = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations \
             WHERE share_link_id = $1 ORDER BY updated_at DESC, device_id"
        );

        let rows = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(share_link_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(TrackedLocation::from).collect())
    }

    async fn update(
        &self,
        device_id: &str,
        patch: LocationPatch,
        now: i64,
    ) -> Result<Option<TrackedLocation>, AppError> {
        let sql = format!(
            r#"
            UPDATE locations SET
                ip = COALESCE($2, ip),
                latitude = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude),
                nickname = COALESCE($5, nickname),
                updated_at = GREATEST(updated_at, $6)
            WHERE device_id = $1
            RETURNING {LOCATION_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LocationRow>(&sql)
            .bind(device_id)
            .bind(patch.ip)
            .bind(patch.latitude)
            .bind(patch.longitude)
            .bind(patch.nickname)
            .bind(now)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(TrackedLocation::from))
    }

    async fn delete(&self, device_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE device_id = $1")
            .bind(device_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
