//! PostgreSQL implementation of share link repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShareLink, ShareLink, ShareLinkPatch};
use crate::domain::repositories::ShareLinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on;

/// PostgreSQL repository for share links.
pub struct PgShareLinkRepository {
    pool: Arc<PgPool>,
}

impl PgShareLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const SHARE_LINK_COLUMNS: &str = "id, name, title, description, image_url, expiration_date, url, \
     short_code, short_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ShareLinkRow {
    id: String,
    name: String,
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    expiration_date: Option<String>,
    url: String,
    short_code: Option<String>,
    short_url: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<ShareLinkRow> for ShareLink {
    fn from(row: ShareLinkRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            expiration_date: row.expiration_date,
            url: row.url,
            short_code: row.short_code,
            short_url: row.short_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ShareLinkRepository for PgShareLinkRepository {
    async fn create(&self, new_link: NewShareLink) -> Result<ShareLink, AppError> {
        let sql = format!(
            r#"
            INSERT INTO share_links (
                id, name, title, description, image_url, expiration_date, url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {SHARE_LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ShareLinkRow>(&sql)
            .bind(&new_link.id)
            .bind(&new_link.name)
            .bind(&new_link.title)
            .bind(&new_link.description)
            .bind(&new_link.image_url)
            .bind(&new_link.expiration_date)
            .bind(&new_link.url)
            .bind(new_link.created_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation_on(&e, "share_links_pkey") {
                    AppError::conflict(
                        "Share link already exists",
                        json!({ "id": new_link.id }),
                    )
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ShareLink>, AppError> {
        let sql = format!("SELECT {SHARE_LINK_COLUMNS} FROM share_links WHERE id = $1");

        let row = sqlx::query_as::<_, ShareLinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShareLink::from))
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<ShareLink>, AppError> {
        let sql = format!("SELECT {SHARE_LINK_COLUMNS} FROM share_links WHERE short_code = $1");

        let row = sqlx::query_as::<_, ShareLinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShareLink::from))
    }

    async fn list(&self) -> Result<Vec<ShareLink>, AppError> {
        let sql = format!("SELECT {SHARE_LINK_COLUMNS} FROM share_links ORDER BY created_at DESC, id");

        let rows = sqlx::query_as::<_, ShareLinkRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ShareLink::from).collect())
    }

    async fn update(
        &self,
        id: &str,
        patch: ShareLinkPatch,
        now: i64,
    ) -> Result<Option<ShareLink>, AppError> {
        let sql = format!(
            r#"
            UPDATE share_links SET
                name = COALESCE($2, name),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                expiration_date = COALESCE($6, expiration_date),
                updated_at = GREATEST(updated_at, $7)
            WHERE id = $1
            RETURNING {SHARE_LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ShareLinkRow>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.image_url)
            .bind(patch.expiration_date)
            .bind(now)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShareLink::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM share_links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_short_url(
        &self,
        id: &str,
        code: &str,
        short_url: &str,
        now: i64,
    ) -> Result<Option<ShareLink>, AppError> {
        let sql = format!(
            r#"
            UPDATE share_links SET
                short_code = $2,
                short_url = $3,
                updated_at = GREATEST(updated_at, $4)
            WHERE id = $1 AND short_url IS NULL
            RETURNING {SHARE_LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ShareLinkRow>(&sql)
            .bind(id)
            .bind(code)
            .bind(short_url)
            .bind(now)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation_on(&e, "share_links_short_code_key") {
                    AppError::conflict("Short code already exists", json!({ "code": code }))
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(row.map(ShareLink::from))
    }
}
